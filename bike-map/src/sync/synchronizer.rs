//! Polling station synchronizer.
//!
//! Each cycle runs `idle → fetching → settled | failed → idle`. Cycles are
//! single-flight: a tick or manual refetch that arrives while a fetch is
//! outstanding is skipped, not queued, so at most one request is ever in
//! flight and completions apply in issue order. Missed ticks are skipped
//! as well rather than fired in a burst.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::BikeApi;
use crate::clock::SharedClock;
use crate::lifecycle::TaskSlot;

use super::state::{SyncOutcome, SyncState};

/// Default interval between live polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for the synchronizer.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Time between scheduled fetches.
    pub interval: Duration,
}

impl SyncConfig {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

/// Owner of the live station collection.
///
/// Consumers [`subscribe`](Self::subscribe) to snapshots; only the
/// synchronizer writes them. Cloning yields another handle to the same
/// synchronizer.
#[derive(Clone)]
pub struct StationSync {
    inner: Arc<Inner>,
}

struct Inner {
    api: BikeApi,
    clock: SharedClock,
    interval: Duration,
    state: watch::Sender<SyncState>,
    in_flight: AtomicBool,
    slot: TaskSlot,
}

impl StationSync {
    pub fn new(api: BikeApi, clock: SharedClock, config: SyncConfig) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        Self {
            inner: Arc::new(Inner {
                api,
                clock,
                interval: config.interval,
                state,
                in_flight: AtomicBool::new(false),
                slot: TaskSlot::new(),
            }),
        }
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> SyncState {
        self.inner.state.borrow().clone()
    }

    /// Start polling: one fetch now, then one per interval.
    ///
    /// Returns `false` if polling was already running.
    pub fn start(&self) -> bool {
        let inner = self.inner.clone();
        let started = self.inner.slot.start(move |wake| run(inner, wake));
        if started {
            info!(interval_secs = self.inner.interval.as_secs(), "station sync started");
        }
        started
    }

    /// Stop polling.
    ///
    /// After this returns no new fetch begins and no fetch already in
    /// flight will publish its result. A later [`start`](Self::start)
    /// resumes polling.
    pub fn stop(&self) {
        if self.inner.slot.stop() {
            info!("station sync stopped");
        }
        // A cancelled fetch leaves `loading` set; clear it for any reader
        // that outlives the teardown.
        self.inner.state.send_if_modified(|state| {
            let was_loading = state.loading;
            state.loading = false;
            was_loading
        });
    }

    pub fn is_running(&self) -> bool {
        self.inner.slot.is_running()
    }

    /// Fetch now and push the next scheduled tick to `now + interval`.
    ///
    /// If a fetch is already in flight this returns
    /// [`SyncOutcome::Skipped`] without issuing another request.
    pub async fn refetch(&self) -> SyncOutcome {
        self.inner.slot.wake();
        self.inner.sync_once().await
    }
}

async fn run(inner: Arc<Inner>, wake: Arc<Notify>) {
    let mut ticker = tokio::time::interval(inner.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                inner.sync_once().await;
            }
            () = wake.notified() => {
                debug!("manual refetch, rescheduling next tick");
                ticker.reset();
            }
        }
    }
}

impl Inner {
    async fn sync_once(&self) -> SyncOutcome {
        let Some(epoch) = self.slot.current_epoch() else {
            return SyncOutcome::Cancelled;
        };
        let Some(_flight) = FlightGuard::acquire(&self.in_flight) else {
            debug!("station fetch already in flight, skipping");
            return SyncOutcome::Skipped;
        };

        let began = self.slot.publish_if_current(epoch, || {
            self.state.send_modify(|state| {
                state.loading = true;
                state.error = None;
            });
        });
        if !began {
            return SyncOutcome::Cancelled;
        }

        let result = self.api.realtime_stations().await;

        let outcome = match result {
            Ok(stations) => {
                let count = stations.len();
                let stations = Arc::new(stations);
                let now = self.clock.utc();
                let applied = self.slot.publish_if_current(epoch, || {
                    self.state.send_modify(|state| {
                        state.stations = stations;
                        state.loading = false;
                        state.error = None;
                        state.last_updated = Some(now);
                    });
                });
                if applied {
                    debug!(stations = count, "station sync settled");
                }
                (applied, SyncOutcome::Published { stations: count })
            }
            Err(e) => {
                let message = e.to_string();
                let applied = self.slot.publish_if_current(epoch, || {
                    self.state.send_modify(|state| {
                        state.loading = false;
                        state.error = Some(message);
                    });
                });
                if applied {
                    warn!(error = %e, "station sync failed");
                }
                (applied, SyncOutcome::Failed(e))
            }
        };

        match outcome {
            (true, outcome) => outcome,
            (false, _) => {
                debug!("station sync result discarded after stop");
                SyncOutcome::Cancelled
            }
        }
    }
}

/// Holds the single-flight flag for the duration of one fetch.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
