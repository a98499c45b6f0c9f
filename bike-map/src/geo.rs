//! One-shot user geolocation with a default-centre fallback.
//!
//! A [`GeoSession`] is created at session start and dropped at session end;
//! it replaces any process-wide position cache. The first [`locate`] asks
//! the platform [`PositionSource`] once, with a timeout, and every later
//! call returns that same fix. Failure is never surfaced as an error: the
//! session substitutes [`DEFAULT_CENTER`] and keeps the reason for display.
//!
//! [`locate`]: GeoSession::locate

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

use crate::domain::{DEFAULT_CENTER, UserLocation};

/// Default time allowed for the platform to produce a position.
pub const DEFAULT_GEO_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a position couldn't be acquired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeoError {
    /// The user refused location access
    #[error("location permission denied")]
    PermissionDenied,

    /// The platform has no location service
    #[error("location services are not supported")]
    Unsupported,

    /// The platform didn't answer in time
    #[error("timed out waiting for a location fix")]
    Timeout,

    /// The platform answered with an unusable position
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Platform position provider.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self) -> Result<UserLocation, GeoError>;
}

/// A position fixed by configuration.
///
/// With no position configured it behaves like a platform without location
/// services.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPosition {
    position: Option<UserLocation>,
}

impl ConfiguredPosition {
    pub fn new(position: Option<UserLocation>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl PositionSource for ConfiguredPosition {
    async fn current_position(&self) -> Result<UserLocation, GeoError> {
        self.position.ok_or(GeoError::Unsupported)
    }
}

/// Result of a location request. The location is always usable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoFix {
    pub location: UserLocation,
    /// Why the default centre is being shown instead of a real fix.
    pub error: Option<String>,
}

impl GeoFix {
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Configuration for a geolocation session.
#[derive(Debug, Clone)]
pub struct GeoConfig {
    pub timeout: Duration,
    /// Position substituted on failure.
    pub default_center: UserLocation,
}

impl GeoConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_GEO_TIMEOUT,
            default_center: DEFAULT_CENTER,
        }
    }
}

/// Session-scoped location state.
pub struct GeoSession {
    source: Arc<dyn PositionSource>,
    config: GeoConfig,
    /// Held for the duration of an acquisition, so only one is ever outstanding.
    acquiring: Mutex<()>,
    fix: watch::Sender<Option<GeoFix>>,
}

impl GeoSession {
    pub fn new(source: Arc<dyn PositionSource>, config: GeoConfig) -> Self {
        let (fix, _) = watch::channel(None);
        Self {
            source,
            config,
            acquiring: Mutex::new(()),
            fix,
        }
    }

    /// The session's location, acquiring it on first use.
    ///
    /// Concurrent callers share one platform request.
    pub async fn locate(&self) -> GeoFix {
        let _acquiring = self.acquiring.lock().await;
        let cached = self.fix.borrow().clone();
        if let Some(fix) = cached {
            return fix;
        }
        self.acquire().await
    }

    /// Ask the platform again, replacing the cached fix.
    pub async fn relocate(&self) -> GeoFix {
        let _acquiring = self.acquiring.lock().await;
        self.acquire().await
    }

    /// The cached fix, if one has been acquired.
    pub fn cached(&self) -> Option<GeoFix> {
        self.fix.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<GeoFix>> {
        self.fix.subscribe()
    }

    async fn acquire(&self) -> GeoFix {
        let result = tokio::time::timeout(self.config.timeout, self.source.current_position())
            .await
            .unwrap_or(Err(GeoError::Timeout))
            .and_then(|location| {
                if location.is_valid() {
                    Ok(location)
                } else {
                    Err(GeoError::Unavailable(format!(
                        "invalid coordinates ({}, {})",
                        location.latitude, location.longitude
                    )))
                }
            });

        let fix = match result {
            Ok(location) => {
                info!(
                    latitude = location.latitude,
                    longitude = location.longitude,
                    accuracy = ?location.accuracy,
                    "location acquired"
                );
                GeoFix {
                    location,
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "location unavailable, using default centre");
                GeoFix {
                    location: self.config.default_center,
                    error: Some(e.to_string()),
                }
            }
        };

        self.fix.send_replace(Some(fix.clone()));
        fix
    }
}
