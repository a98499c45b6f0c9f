//! Bike-share API gateway.
//!
//! `client` owns the HTTP transport behind the [`Gateway`] trait; `service`
//! layers typed endpoints on top. Nothing in this module keeps state or
//! retries: callers decide what a failure means for them.
//!
//! Remote contract:
//! - `GET /health`
//! - `GET /api/stations/realtime`
//! - `POST /api/recommendations/nearby`, `POST /api/recommendations/route`
//! - `GET /api/stations/{id}/predict?hours=N`, `GET /api/stations/{id}/trend?hours=N`
//! - `POST /api/data/collect`

mod client;
mod convert;
mod error;
mod mock;
mod sample;
mod service;
mod types;

pub use client::{ApiClient, ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Gateway, Params};
pub use convert::{ConversionError, convert_station_row, convert_station_rows};
pub use error::ApiError;
pub use mock::{MockGateway, RecordedCall};
pub use sample::{SampleError, builtin_sample_stations, load_sample_stations};
pub use service::{BikeApi, DEFAULT_PREDICT_HOURS, DEFAULT_TREND_HOURS};
pub use types::{CollectionAck, Envelope, HealthResponse, Lenient, StationRow};
