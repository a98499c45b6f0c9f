//! Static station data for fallback mode.
//!
//! When the remote service is unreachable (or the user turns live mode off)
//! the map shows a fixed station list instead. The list is read from a JSON
//! file in the realtime feed's row format, either bare (`[rows]`) or wrapped
//! in the usual `{success, data}` envelope. Without a file, a small built-in
//! sample around central Seoul is used.

use std::path::Path;

use serde::Deserialize;

use crate::domain::Station;

use super::convert::convert_station_rows;
use super::types::{Lenient, StationRow};

/// Errors loading a sample data file.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    /// File couldn't be read
    #[error("failed to read sample data {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File isn't a station list
    #[error("failed to parse sample data {path}: {message}")]
    Json { path: String, message: String },

    /// File parsed but held no usable stations
    #[error("sample data {path} contains no valid stations")]
    Empty { path: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SampleFile {
    Bare(Vec<StationRow>),
    Wrapped { data: Vec<StationRow> },
}

/// Load fallback stations from a JSON file.
pub fn load_sample_stations(path: impl AsRef<Path>) -> Result<Vec<Station>, SampleError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let json = std::fs::read_to_string(path).map_err(|source| SampleError::Io {
        path: display.clone(),
        source,
    })?;

    let file: SampleFile = serde_json::from_str(&json).map_err(|e| SampleError::Json {
        path: display.clone(),
        message: e.to_string(),
    })?;

    let rows = match file {
        SampleFile::Bare(rows) => rows,
        SampleFile::Wrapped { data } => data,
    };

    let stations = convert_station_rows(&rows);
    if stations.is_empty() {
        return Err(SampleError::Empty { path: display });
    }
    Ok(stations)
}

/// Built-in fallback stations.
pub fn builtin_sample_stations() -> Vec<Station> {
    const ROWS: &[(&str, &str, u32, u32, &str, &str)] = &[
        ("ST-1001", "Seoul City Hall", 6, 20, "37.56650", "126.97800"),
        ("ST-1002", "Gwanghwamun Square", 0, 15, "37.57250", "126.97690"),
        ("ST-1003", "Deoksugung Stonewall Road", 12, 15, "37.56570", "126.97510"),
        ("ST-1004", "Euljiro 1-ga Station", 2, 10, "37.56600", "126.98220"),
        ("ST-1005", "Myeongdong Cathedral", 9, 18, "37.56330", "126.98700"),
        ("ST-1006", "Seoul Station Exit 1", 20, 25, "37.55470", "126.97060"),
    ];

    let rows: Vec<StationRow> = ROWS
        .iter()
        .map(|&(id, name, bikes, racks, lat, lng)| StationRow {
            station_id: id.to_string(),
            station_name: name.to_string(),
            parking_bike_tot_cnt: Lenient::Int(u64::from(bikes)),
            rack_tot_cnt: Lenient::Int(u64::from(racks)),
            station_latitude: Lenient::Text(lat.to_string()),
            station_longitude: Lenient::Text(lng.to_string()),
            shared: None,
        })
        .collect();

    convert_station_rows(&rows)
}
