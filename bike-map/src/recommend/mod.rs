//! Nearby-station and route recommendations.
//!
//! Unlike station sync this is request/response: nothing polls. Each call
//! either publishes new results or records an error, leaving the previous
//! results in place.

mod error;
mod fetcher;

pub use error::RecommendationError;
pub use fetcher::{RecommendationState, Recommender};
