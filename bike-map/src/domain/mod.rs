//! Domain types for the bike-share map.
//!
//! Everything here is plain data plus pure functions. Network access and
//! state ownership live in the `api`, `sync`, `recommend` and `health`
//! modules.

mod health;
mod insight;
mod location;
mod recommendation;
mod station;
mod status;

pub use health::{HealthState, HealthStatus};
pub use insight::{Prediction, StationOverview, TrendPoint};
pub use location::{
    DEFAULT_CENTER, METRES_PER_DEGREE, UserLocation, planar_distance_m, valid_coordinates,
};
pub use recommendation::{
    DEFAULT_TOP_N, NearbyRequest, Purpose, Recommendation, RouteInfo, RoutePlan, RouteRequest,
};
pub use station::{Station, valid_station_id};
pub use status::{HIGH_RATIO, LOW_RATIO, StationStatus, availability_rate, classify};
