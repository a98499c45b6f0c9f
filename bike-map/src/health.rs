//! Periodic reachability checks against the remote service.
//!
//! Health failures never propagate: every error, and every answer other
//! than `"healthy"`, just marks the service unhealthy.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::BikeApi;
use crate::clock::SharedClock;
use crate::domain::HealthStatus;
use crate::lifecycle::TaskSlot;

/// Default interval between health checks.
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub interval: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_HEALTH_INTERVAL,
        }
    }
}

/// Tracks whether the remote service is up.
#[derive(Clone)]
pub struct HealthMonitor {
    inner: Arc<Inner>,
}

struct Inner {
    api: BikeApi,
    clock: SharedClock,
    interval: Duration,
    state: watch::Sender<HealthStatus>,
    slot: TaskSlot,
}

impl HealthMonitor {
    pub fn new(api: BikeApi, clock: SharedClock, config: HealthConfig) -> Self {
        let (state, _) = watch::channel(HealthStatus::default());
        Self {
            inner: Arc::new(Inner {
                api,
                clock,
                interval: config.interval,
                state,
                slot: TaskSlot::new(),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<HealthStatus> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> HealthStatus {
        self.inner.state.borrow().clone()
    }

    /// Check immediately, then once per interval.
    pub fn start(&self) -> bool {
        let inner = self.inner.clone();
        let started = self.inner.slot.start(move |_| run(inner));
        if started {
            info!(
                interval_secs = self.inner.interval.as_secs(),
                "health monitor started"
            );
        }
        started
    }

    /// Stop checking. A check in flight will not publish.
    pub fn stop(&self) {
        if self.inner.slot.stop() {
            info!("health monitor stopped");
        }
    }

    /// Run one check now and return its result.
    pub async fn check(&self) -> HealthStatus {
        let epoch = self.inner.slot.current_epoch();
        let status = self.inner.probe().await;
        match epoch {
            Some(epoch) => {
                self.inner.slot.publish_if_current(epoch, || {
                    self.inner.state.send_replace(status.clone());
                });
            }
            None => debug!("health monitor stopped, not publishing manual check"),
        }
        status
    }
}

async fn run(inner: Arc<Inner>) {
    let mut ticker = tokio::time::interval(inner.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let Some(epoch) = inner.slot.current_epoch() else {
            return;
        };
        let status = inner.probe().await;
        inner.slot.publish_if_current(epoch, || {
            inner.state.send_replace(status);
        });
    }
}

impl Inner {
    async fn probe(&self) -> HealthStatus {
        let result = self.api.health().await;
        let now = self.clock.utc();
        match result {
            Ok(response) if response.status == "healthy" => {
                debug!("remote service healthy");
                HealthStatus::healthy(now)
            }
            Ok(response) => {
                warn!(status = %response.status, "remote service reports degraded status");
                HealthStatus::unhealthy(format!("service status: {}", response.status), now)
            }
            Err(e) => {
                warn!(error = %e, "health check failed");
                HealthStatus::unhealthy(e.to_string(), now)
            }
        }
    }
}
