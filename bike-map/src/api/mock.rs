//! Scriptable in-memory gateway.
//!
//! Serves canned JSON or errors per path and records every call, so the
//! layers above the gateway can be exercised without a server. A mock can
//! also be *held*: calls made while held stay in flight until released,
//! which is how tests observe overlapping and cancelled requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use super::client::{Gateway, Params};
use super::error::ApiError;

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// In-memory [`Gateway`] with per-path replies.
pub struct MockGateway {
    replies: Mutex<HashMap<String, Result<Value, ApiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    open: watch::Sender<bool>,
}

impl MockGateway {
    /// Create a mock with no replies; unknown paths answer HTTP 404.
    pub fn new() -> Self {
        let (open, _) = watch::channel(true);
        Self {
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            open,
        }
    }

    /// Answer `path` with this JSON from now on.
    pub fn respond_json(&self, path: &str, value: Value) {
        lock(&self.replies).insert(path.to_string(), Ok(value));
    }

    /// Fail `path` with this error from now on.
    pub fn respond_error(&self, path: &str, error: ApiError) {
        lock(&self.replies).insert(path.to_string(), Err(error));
    }

    /// Keep subsequent calls in flight until [`release`](Self::release).
    pub fn hold(&self) {
        self.open.send_replace(false);
    }

    /// Let held calls complete.
    pub fn release(&self) {
        self.open.send_replace(true);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls made to `path`.
    pub fn call_count(&self, path: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.path == path).count()
    }

    /// Calls currently waiting on a reply.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous calls seen.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(&self, call: RecordedCall) -> Result<Value, ApiError> {
        let path = call.path.clone();
        lock(&self.calls).push(call);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _done = InFlight(&self.in_flight);

        let mut open = self.open.subscribe();
        // The sender lives in `self`, so this only ends when the gate opens.
        let _ = open.wait_for(|open| *open).await;

        lock(&self.replies)
            .get(&path)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::http(404, format!("no mock reply for {path}"))))
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn get(&self, path: &str, params: Params<'_>) -> Result<Value, ApiError> {
        self.answer(RecordedCall {
            method: "GET",
            path: path.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body: None,
        })
        .await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.answer(RecordedCall {
            method: "POST",
            path: path.to_string(),
            params: Vec::new(),
            body,
        })
        .await
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
