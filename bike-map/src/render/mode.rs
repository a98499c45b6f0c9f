//! Live vs. fallback display mode.

use serde::{Deserialize, Serialize};

use crate::domain::HealthStatus;

/// Which data source the map shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Stations from the live synchronizer.
    Live,
    /// Bundled sample stations, no polling.
    Fallback,
}

/// Whether the health check permits live mode at all.
pub fn can_use_live(health: &HealthStatus) -> bool {
    health.is_healthy()
}

/// Pick the display mode from the latest health check and the user toggle.
///
/// Live mode requires both a healthy service and the user asking for it.
/// An unknown health state counts as unavailable.
pub fn select_mode(health: &HealthStatus, live_requested: bool) -> DisplayMode {
    if live_requested && can_use_live(health) {
        DisplayMode::Live
    } else {
        DisplayMode::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn live_needs_health_and_toggle() {
        let now = Utc::now();
        let healthy = HealthStatus::healthy(now);
        let down = HealthStatus::unhealthy("connection refused", now);
        let unknown = HealthStatus::default();

        assert_eq!(select_mode(&healthy, true), DisplayMode::Live);
        assert_eq!(select_mode(&healthy, false), DisplayMode::Fallback);
        assert_eq!(select_mode(&down, true), DisplayMode::Fallback);
        assert_eq!(select_mode(&unknown, true), DisplayMode::Fallback);
    }
}
