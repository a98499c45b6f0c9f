//! Start/stop bookkeeping for background loops.
//!
//! A [`TaskSlot`] owns at most one spawned loop and an *epoch* counter.
//! Work captures the epoch when it begins and may only publish results
//! through [`TaskSlot::publish_if_current`], which checks the epoch under
//! the same lock `stop` takes. Once `stop` returns, nothing begun before it
//! can publish.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tokio::task::JoinHandle;

#[derive(Default)]
struct SlotState {
    epoch: u64,
    stopped: bool,
    task: Option<JoinHandle<()>>,
    wake: Option<Arc<Notify>>,
}

/// Lifecycle of one background loop.
#[derive(Default)]
pub(crate) struct TaskSlot {
    state: Mutex<SlotState>,
}

impl TaskSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Epoch new work should run under, or `None` once stopped.
    pub(crate) fn current_epoch(&self) -> Option<u64> {
        let state = self.lock();
        (!state.stopped).then_some(state.epoch)
    }

    /// Run `publish` only if `epoch` is still current.
    ///
    /// Returns whether it ran.
    pub(crate) fn publish_if_current(&self, epoch: u64, publish: impl FnOnce()) -> bool {
        let state = self.lock();
        if state.stopped || state.epoch != epoch {
            return false;
        }
        publish();
        true
    }

    /// Spawn the loop unless one is already running.
    ///
    /// `make` receives the wake handle the loop should listen on. Starting
    /// after a stop opens a new epoch.
    pub(crate) fn start<F, Fut>(&self, make: F) -> bool
    where
        F: FnOnce(Arc<Notify>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.lock();
        if state.task.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }
        if state.stopped {
            state.epoch += 1;
            state.stopped = false;
        }
        let wake = Arc::new(Notify::new());
        state.task = Some(tokio::spawn(make(wake.clone())));
        state.wake = Some(wake);
        true
    }

    /// Abort the loop and invalidate all outstanding work.
    ///
    /// Returns whether a loop was running.
    pub(crate) fn stop(&self) -> bool {
        let mut state = self.lock();
        state.epoch += 1;
        state.stopped = true;
        state.wake = None;
        match state.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    /// Poke the running loop, if any. The signal is kept until consumed.
    pub(crate) fn wake(&self) {
        if let Some(wake) = &self.lock().wake {
            wake.notify_one();
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.lock()
            .task
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stop_invalidates_epoch() {
        let slot = TaskSlot::new();
        let epoch = slot.current_epoch().unwrap();
        assert!(slot.publish_if_current(epoch, || {}));

        slot.stop();
        assert_eq!(slot.current_epoch(), None);
        let mut ran = false;
        assert!(!slot.publish_if_current(epoch, || ran = true));
        assert!(!ran);
    }

    #[tokio::test]
    async fn restart_opens_new_epoch() {
        let slot = TaskSlot::new();
        let first = slot.current_epoch().unwrap();
        assert!(slot.start(|_| std::future::pending()));
        assert!(slot.is_running());
        assert!(!slot.start(|_| std::future::pending()));

        assert!(slot.stop());
        assert!(slot.start(|_| std::future::pending()));
        let second = slot.current_epoch().unwrap();
        assert_ne!(first, second);
        assert!(!slot.publish_if_current(first, || {}));
        slot.stop();
    }
}
