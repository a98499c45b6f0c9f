//! Conversion from wire rows to domain stations.

use tracing::warn;

use crate::domain::Station;

use super::types::{Lenient, StationRow};

/// Error converting one station row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// A numeric field couldn't be parsed.
    #[error("station {station_id}: invalid {field} {value:?}")]
    InvalidField {
        station_id: String,
        field: &'static str,
        value: String,
    },

    /// Coordinates parsed but are not a real position.
    #[error("station {station_id}: coordinates out of range")]
    OutOfRange { station_id: String },
}

/// Convert one row, parsing coordinates and classifying the station.
pub fn convert_station_row(row: &StationRow) -> Result<Station, ConversionError> {
    let count = |field: &'static str, value: &Lenient| {
        value.as_u32().ok_or_else(|| ConversionError::InvalidField {
            station_id: row.station_id.clone(),
            field,
            value: value.to_text(),
        })
    };
    let coordinate = |field: &'static str, value: &Lenient| {
        value.as_f64().ok_or_else(|| ConversionError::InvalidField {
            station_id: row.station_id.clone(),
            field,
            value: value.to_text(),
        })
    };

    let parking = count("parkingBikeTotCnt", &row.parking_bike_tot_cnt)?;
    let racks = count("rackTotCnt", &row.rack_tot_cnt)?;
    let latitude = coordinate("stationLatitude", &row.station_latitude)?;
    let longitude = coordinate("stationLongitude", &row.station_longitude)?;

    if !crate::domain::valid_coordinates(latitude, longitude) {
        return Err(ConversionError::OutOfRange {
            station_id: row.station_id.clone(),
        });
    }

    let mut station = Station::new(
        row.station_id.clone(),
        row.station_name.clone(),
        parking,
        racks,
        latitude,
        longitude,
    );
    if let Some(shared) = &row.shared {
        station = station.with_shared(shared.to_text());
    }
    Ok(station)
}

/// Convert a whole feed.
///
/// Rows that fail conversion are dropped (and logged) rather than failing
/// the batch: one bad station shouldn't blank the map.
pub fn convert_station_rows(rows: &[StationRow]) -> Vec<Station> {
    let mut stations = Vec::with_capacity(rows.len());
    for row in rows {
        match convert_station_row(row) {
            Ok(station) => stations.push(station),
            Err(e) => warn!(error = %e, "skipping station row"),
        }
    }
    stations
}
