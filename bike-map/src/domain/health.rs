//! Remote service health state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse reachability of the remote service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
    /// No check has completed yet.
    #[default]
    Unknown,
}

/// Latest result of a health check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: HealthState,
    /// Why the last check failed, if it did.
    pub error: Option<String>,
    pub checked_at: Option<DateTime<Utc>>,
}

impl HealthStatus {
    pub fn healthy(at: DateTime<Utc>) -> Self {
        Self {
            status: HealthState::Healthy,
            error: None,
            checked_at: Some(at),
        }
    }

    pub fn unhealthy(error: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: HealthState::Unhealthy,
            error: Some(error.into()),
            checked_at: Some(at),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}
