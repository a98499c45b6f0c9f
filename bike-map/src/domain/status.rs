//! Station availability classification.
//!
//! A station's status is a pure function of its parked-bike count and its
//! rack capacity. The thresholds are inclusive on both ends: a ratio of
//! exactly 0.2 is `Low` and a ratio of exactly 0.8 is `High`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ratio at or below which a non-empty station is considered `Low`.
pub const LOW_RATIO: f64 = 0.2;

/// Ratio at or above which a station is considered `High`.
pub const HIGH_RATIO: f64 = 0.8;

/// Qualitative availability of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    /// No bikes parked.
    Empty,
    /// At most 20% of racks occupied.
    Low,
    /// Between the low and high thresholds.
    Medium,
    /// At least 80% of racks occupied.
    High,
    /// Capacity is zero, so no ratio exists.
    Unknown,
}

impl StationStatus {
    /// All statuses, in legend order.
    pub const ALL: [StationStatus; 5] = [
        StationStatus::Empty,
        StationStatus::Low,
        StationStatus::Medium,
        StationStatus::High,
        StationStatus::Unknown,
    ];

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            StationStatus::Empty => "empty",
            StationStatus::Low => "low",
            StationStatus::Medium => "medium",
            StationStatus::High => "high",
            StationStatus::Unknown => "unknown",
        }
    }

    /// Human-readable label used in popups and the legend.
    pub fn label(&self) -> &'static str {
        match self {
            StationStatus::Empty => "No bikes",
            StationStatus::Low => "Low (20% or less)",
            StationStatus::Medium => "Medium",
            StationStatus::High => "Plenty (80% or more)",
            StationStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fraction of racks holding a bike, or `None` when the station has no racks.
///
/// Counts above capacity are reported as-is (the ratio may exceed 1.0).
pub fn availability_rate(parking_bikes: u32, total_racks: u32) -> Option<f64> {
    if total_racks == 0 {
        return None;
    }
    Some(f64::from(parking_bikes) / f64::from(total_racks))
}

/// Classify a station from its counts.
///
/// Rules, in priority order: zero racks is `Unknown`, zero bikes is `Empty`,
/// ratio ≤ 0.2 is `Low`, ratio ≥ 0.8 is `High`, anything else is `Medium`.
pub fn classify(parking_bikes: u32, total_racks: u32) -> StationStatus {
    let Some(ratio) = availability_rate(parking_bikes, total_racks) else {
        return StationStatus::Unknown;
    };

    if parking_bikes == 0 {
        StationStatus::Empty
    } else if ratio <= LOW_RATIO {
        StationStatus::Low
    } else if ratio >= HIGH_RATIO {
        StationStatus::High
    } else {
        StationStatus::Medium
    }
}
