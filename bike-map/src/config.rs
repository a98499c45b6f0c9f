//! Application settings from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use mockable::Env;

use crate::api::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::domain::UserLocation;
use crate::health::{DEFAULT_HEALTH_INTERVAL, HealthConfig};
use crate::sync::{DEFAULT_POLL_INTERVAL, SyncConfig};

pub const API_URL_ENV: &str = "BIKE_API_URL";
pub const API_TIMEOUT_ENV: &str = "BIKE_API_TIMEOUT_SECS";
pub const POLL_INTERVAL_ENV: &str = "BIKE_POLL_INTERVAL_SECS";
pub const HEALTH_INTERVAL_ENV: &str = "BIKE_HEALTH_INTERVAL_SECS";
pub const LISTEN_ADDR_ENV: &str = "BIKE_LISTEN_ADDR";
pub const SAMPLE_DATA_ENV: &str = "BIKE_SAMPLE_DATA";
pub const LATITUDE_ENV: &str = "BIKE_LATITUDE";
pub const LONGITUDE_ENV: &str = "BIKE_LONGITUDE";
pub const ACCURACY_ENV: &str = "BIKE_ACCURACY";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{present} is set but {missing} is not")]
    Incomplete {
        present: &'static str,
        missing: &'static str,
    },
}

/// Everything the binary needs to wire the components together.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub health: HealthConfig,
    pub listen_addr: SocketAddr,
    /// Replaces the built-in fallback stations when set.
    pub sample_data: Option<PathBuf>,
    /// Fixed position reported to the map, if any.
    pub position: Option<UserLocation>,
}

impl AppConfig {
    /// Read settings, using defaults for anything unset.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigError> {
        let base_url = env
            .string(API_URL_ENV)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = secs(env, API_TIMEOUT_ENV, DEFAULT_TIMEOUT)?;
        let poll = secs(env, POLL_INTERVAL_ENV, DEFAULT_POLL_INTERVAL)?;
        let health = secs(env, HEALTH_INTERVAL_ENV, DEFAULT_HEALTH_INTERVAL)?;
        let listen_addr = parsed(env, LISTEN_ADDR_ENV)?.unwrap_or_else(default_listen_addr);

        Ok(Self {
            api: ApiConfig::new()
                .with_base_url(base_url)
                .with_timeout(timeout),
            sync: SyncConfig::new(poll),
            health: HealthConfig { interval: health },
            listen_addr,
            sample_data: env.string(SAMPLE_DATA_ENV).map(PathBuf::from),
            position: position(env)?,
        })
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn parsed<E: Env, T: FromStr>(env: &E, name: &'static str) -> Result<Option<T>, ConfigError> {
    match env.string(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// A whole number of seconds, at least one.
fn secs<E: Env>(env: &E, name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match parsed::<E, u64>(env, name)? {
        None => Ok(default),
        Some(0) => Err(ConfigError::Invalid {
            name,
            value: "0".to_string(),
        }),
        Some(n) => Ok(Duration::from_secs(n)),
    }
}

fn position<E: Env>(env: &E) -> Result<Option<UserLocation>, ConfigError> {
    let latitude: Option<f64> = parsed(env, LATITUDE_ENV)?;
    let longitude: Option<f64> = parsed(env, LONGITUDE_ENV)?;
    let (latitude, longitude) = match (latitude, longitude) {
        (None, None) => return Ok(None),
        (Some(_), None) => {
            return Err(ConfigError::Incomplete {
                present: LATITUDE_ENV,
                missing: LONGITUDE_ENV,
            });
        }
        (None, Some(_)) => {
            return Err(ConfigError::Incomplete {
                present: LONGITUDE_ENV,
                missing: LATITUDE_ENV,
            });
        }
        (Some(lat), Some(lng)) => (lat, lng),
    };

    let mut location = UserLocation::new(latitude, longitude);
    if !location.is_valid() {
        return Err(ConfigError::Invalid {
            name: LATITUDE_ENV,
            value: format!("{latitude},{longitude}"),
        });
    }
    if let Some(accuracy) = parsed::<E, f64>(env, ACCURACY_ENV)? {
        location = location.with_accuracy(accuracy);
    }
    Ok(Some(location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use std::collections::HashMap;

    fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_env(&mock_env(&[])).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.sync.interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.health.interval, DEFAULT_HEALTH_INTERVAL);
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.sample_data, None);
        assert_eq!(config.position, None);
    }

    #[test]
    fn reads_overrides() {
        let env = mock_env(&[
            (API_URL_ENV, "http://bikes.internal:8080/"),
            (API_TIMEOUT_ENV, "5"),
            (POLL_INTERVAL_ENV, "15"),
            (LISTEN_ADDR_ENV, "0.0.0.0:8000"),
            (SAMPLE_DATA_ENV, "/srv/stations.json"),
            (LATITUDE_ENV, "37.55"),
            (LONGITUDE_ENV, "126.97"),
            (ACCURACY_ENV, "20"),
        ]);
        let config = AppConfig::from_env(&env).unwrap();
        assert_eq!(config.api.base_url, "http://bikes.internal:8080");
        assert_eq!(config.api.timeout, Duration::from_secs(5));
        assert_eq!(config.sync.interval, Duration::from_secs(15));
        assert_eq!(config.listen_addr.port(), 8000);
        assert_eq!(config.sample_data, Some(PathBuf::from("/srv/stations.json")));
        assert_eq!(
            config.position,
            Some(UserLocation::new(37.55, 126.97).with_accuracy(20.0))
        );
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = AppConfig::from_env(&mock_env(&[(POLL_INTERVAL_ENV, "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: POLL_INTERVAL_ENV,
                value: "soon".to_string()
            }
        );

        let err = AppConfig::from_env(&mock_env(&[(API_TIMEOUT_ENV, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: API_TIMEOUT_ENV, .. }));
    }

    #[test]
    fn position_needs_both_coordinates() {
        let err = AppConfig::from_env(&mock_env(&[(LATITUDE_ENV, "37.5")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "BIKE_LATITUDE is set but BIKE_LONGITUDE is not"
        );

        let err = AppConfig::from_env(&mock_env(&[(LATITUDE_ENV, "137.5"), (LONGITUDE_ENV, "127")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
