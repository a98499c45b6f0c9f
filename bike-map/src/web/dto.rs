//! Data transfer objects for web requests and responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::ApiError;
use crate::domain::{Purpose, Recommendation, UserLocation};
use crate::recommend::RecommendationError;
use crate::render::DisplayMode;
use crate::sync::SyncOutcome;

/// Request for nearby recommendations at the user's position.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendRequest {
    /// Rental (default) or return
    pub purpose: Option<Purpose>,

    /// How many stations to ask for (default 10)
    pub top_n: Option<u32>,
}

/// Nearby recommendations and where they were computed from.
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub location: UserLocation,
    /// The location is the default centre, not the user's position
    pub approximate_location: bool,
    pub recommendations: Vec<Recommendation>,
}

/// Request to set the live-mode toggle.
#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub live: bool,
}

#[derive(Debug, Serialize)]
pub struct ModeResponse {
    pub live_requested: bool,
    pub mode: DisplayMode,
}

/// Result of a manual refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// `published`, `failed`, `skipped` or `cancelled`
    pub outcome: &'static str,
    pub stations: Option<usize>,
    pub error: Option<String>,
}

impl From<SyncOutcome> for RefreshResponse {
    fn from(outcome: SyncOutcome) -> Self {
        match outcome {
            SyncOutcome::Published { stations } => Self {
                outcome: "published",
                stations: Some(stations),
                error: None,
            },
            SyncOutcome::Failed(e) => Self {
                outcome: "failed",
                stations: None,
                error: Some(e.to_string()),
            },
            SyncOutcome::Skipped => Self {
                outcome: "skipped",
                stations: None,
                error: None,
            },
            SyncOutcome::Cancelled => Self {
                outcome: "cancelled",
                stations: None,
                error: None,
            },
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Handler failure, rendered as a JSON [`ErrorResponse`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },

    /// The bike-share service failed or answered nonsense
    #[error("{message}")]
    Upstream { message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Upstream {
            message: err.to_string(),
        }
    }
}

impl From<RecommendationError> for AppError {
    fn from(err: RecommendationError) -> Self {
        AppError::Upstream {
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "request failed upstream");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_response_from_outcome() {
        let published = RefreshResponse::from(SyncOutcome::Published { stations: 12 });
        assert_eq!(published.outcome, "published");
        assert_eq!(published.stations, Some(12));

        let failed = RefreshResponse::from(SyncOutcome::Failed(ApiError::http(500, "boom")));
        assert_eq!(failed.outcome, "failed");
        assert_eq!(
            failed.error.as_deref(),
            Some("network error (HTTP 500): boom")
        );
    }

    #[test]
    fn error_status_codes() {
        let bad = AppError::BadRequest {
            message: "top_n must be at least 1".into(),
        };
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let upstream = AppError::from(ApiError::validation("missing data"));
        assert_eq!(upstream.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn recommend_request_fields_are_optional() {
        let req: RecommendRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.purpose, None);
        assert_eq!(req.top_n, None);

        let req: RecommendRequest =
            serde_json::from_str(r#"{"purpose": "return", "top_n": 3}"#).unwrap();
        assert_eq!(req.purpose, Some(Purpose::Return));
    }
}
