//! Station snapshot type.

use serde::{Deserialize, Serialize};

use super::status::{StationStatus, availability_rate, classify};

/// A bike-dock station as displayed on the map.
///
/// Stations are immutable snapshots: every sync cycle replaces the whole
/// collection. The derived fields are filled in by [`Station::new`] and can't
/// disagree with the counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub station_id: String,
    pub station_name: String,
    pub rack_tot_cnt: u32,
    pub parking_bike_tot_cnt: u32,
    pub latitude: f64,
    pub longitude: f64,
    /// Share of racks in use as reported by the feed, if any.
    pub shared: Option<String>,
    /// `parking / racks`, absent when the station has no racks.
    pub availability_rate: Option<f64>,
    pub status: StationStatus,
}

impl Station {
    /// Build a station, classifying it from its counts.
    pub fn new(
        station_id: impl Into<String>,
        station_name: impl Into<String>,
        parking_bike_tot_cnt: u32,
        rack_tot_cnt: u32,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            station_name: station_name.into(),
            rack_tot_cnt,
            parking_bike_tot_cnt,
            latitude,
            longitude,
            shared: None,
            availability_rate: availability_rate(parking_bike_tot_cnt, rack_tot_cnt),
            status: classify(parking_bike_tot_cnt, rack_tot_cnt),
        }
    }

    /// Attach the feed's `shared` figure.
    pub fn with_shared(mut self, shared: impl Into<String>) -> Self {
        self.shared = Some(shared.into());
        self
    }

    /// Availability as a percentage with one decimal, e.g. `"26.7%"`.
    pub fn availability_percent(&self) -> Option<String> {
        self.availability_rate
            .map(|rate| format!("{:.1}%", rate * 100.0))
    }
}

/// Whether `id` can be sent as a single URL path segment unchanged.
///
/// Rejects empty ids, `.` and `..`, and anything containing a separator,
/// escape, whitespace or control character.
pub fn valid_station_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.chars().any(|c| {
            matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control()
        })
}
