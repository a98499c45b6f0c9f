//! Recommendation error type.

use crate::api::ApiError;

/// A recommendation request failed. The previous results are untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("recommendation failed: {message}")]
pub struct RecommendationError {
    pub message: String,
}

impl RecommendationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ApiError> for RecommendationError {
    fn from(err: ApiError) -> Self {
        Self::new(err.to_string())
    }
}
