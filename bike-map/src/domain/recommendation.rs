//! Nearby and route recommendation types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::location::valid_coordinates;

/// Default number of suggestions requested by the map's "nearby" action.
pub const DEFAULT_TOP_N: u32 = 10;

/// What the user intends to do at the suggested station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Pick up a bike.
    #[default]
    Rental,
    /// Drop a bike off.
    Return,
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Purpose::Rental => f.write_str("rental"),
            Purpose::Return => f.write_str("return"),
        }
    }
}

/// Body of `POST /api/recommendations/nearby`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub purpose: Purpose,
    pub top_n: u32,
}

impl NearbyRequest {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            purpose: Purpose::default(),
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn with_top_n(mut self, top_n: u32) -> Self {
        self.top_n = top_n;
        self
    }

    /// Check the request before it goes on the wire.
    pub fn validate(&self) -> Result<(), String> {
        if !valid_coordinates(self.latitude, self.longitude) {
            return Err(format!(
                "invalid coordinates ({}, {})",
                self.latitude, self.longitude
            ));
        }
        if self.top_n == 0 {
            return Err("top_n must be at least 1".to_string());
        }
        Ok(())
    }
}

/// A ranked suggestion returned by the recommendation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub station_id: String,
    pub station_name: String,
    pub current_bikes: u32,
    pub distance_km: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Score in `0.0..=1.0`, higher is better.
    pub recommendation_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_racks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walking_time_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Recommendation {
    /// Score as a whole number out of 100, as shown in the panel.
    pub fn score_points(&self) -> u32 {
        (self.recommendation_score.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

/// Body of `POST /api/recommendations/route`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: f64,
    pub end_longitude: f64,
}

impl RouteRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !valid_coordinates(self.start_latitude, self.start_longitude) {
            return Err("invalid start coordinates".to_string());
        }
        if !valid_coordinates(self.end_latitude, self.end_longitude) {
            return Err("invalid end coordinates".to_string());
        }
        Ok(())
    }
}

/// Summary of a route between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub total_distance_km: f64,
    pub estimated_bike_time_minutes: u32,
    pub generated_at: String,
}

/// Stations suggested for both ends of a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub departure_stations: Vec<Recommendation>,
    pub arrival_stations: Vec<Recommendation>,
    pub route_info: RouteInfo,
}
