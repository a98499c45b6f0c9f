//! Per-station forecast and history records.

use serde::{Deserialize, Serialize};

/// One forecast point from `GET /api/stations/{id}/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub station_id: String,
    #[serde(default)]
    pub station_name: Option<String>,
    pub predicted_time: String,
    pub hours_ahead: u32,
    pub predicted_bikes: u32,
    pub current_bikes: u32,
    pub total_racks: u32,
    pub predicted_availability: f64,
}

/// One historical sample from `GET /api/stations/{id}/trend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub station_id: String,
    #[serde(default)]
    pub station_name: Option<String>,
    pub park_cnt: u32,
    pub rack_cnt: u32,
    pub collected_at: String,
}

/// Forecast and history for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationOverview {
    pub station_id: String,
    pub predictions: Vec<Prediction>,
    pub trend: Vec<TrendPoint>,
}
