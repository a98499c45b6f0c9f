//! Wire DTOs for the bike-share API.
//!
//! These mirror the JSON the server sends. Station rows are lenient about
//! number encoding because the upstream feed sends counts and coordinates
//! as strings as often as numbers.

use serde::{Deserialize, Serialize};

/// The `{success, data, message}` wrapper every `/api` endpoint uses.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    /// Explanation, usually present when `success` is false.
    pub message: Option<String>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A JSON scalar that may arrive as a number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Lenient {
    Int(u64),
    Float(f64),
    Text(String),
}

impl Lenient {
    /// Read as a float. Strings are trimmed before parsing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Lenient::Int(n) => Some(*n as f64),
            Lenient::Float(f) => Some(*f),
            Lenient::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Read as a non-negative count.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Lenient::Int(n) => u32::try_from(*n).ok(),
            Lenient::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX) => {
                Some(*f as u32)
            }
            Lenient::Float(_) => None,
            Lenient::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Render as text, the way it would be shown.
    pub fn to_text(&self) -> String {
        match self {
            Lenient::Int(n) => n.to_string(),
            Lenient::Float(f) => f.to_string(),
            Lenient::Text(s) => s.clone(),
        }
    }
}

/// One row of `GET /api/stations/realtime`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRow {
    pub station_id: String,
    pub station_name: String,
    pub parking_bike_tot_cnt: Lenient,
    pub rack_tot_cnt: Lenient,
    /// Numeric string in the live feed.
    pub station_latitude: Lenient,
    /// Numeric string in the live feed.
    pub station_longitude: Lenient,
    #[serde(default)]
    pub shared: Option<Lenient>,
}

/// Response data of `POST /api/data/collect`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CollectionAck {
    pub message: String,
    #[serde(default)]
    pub collected_at: Option<String>,
}
