//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use tracing::info;

use crate::api::CollectionAck;
use crate::domain::{NearbyRequest, StationOverview, valid_station_id};
use crate::render::MapView;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/view", get(view))
        .route("/api/refresh", post(refresh))
        .route("/api/recommendations", post(recommendations))
        .route("/api/mode", put(set_mode))
        .route("/api/stations/:id/overview", get(station_overview))
        .route("/api/collect", post(collect))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The composed map view for the current mode.
async fn view(State(state): State<AppState>) -> Json<MapView> {
    Json(state.view())
}

/// Fetch live stations now.
async fn refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    Json(state.sync.refetch().await.into())
}

/// Recommend stations near the user.
async fn recommendations(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let fix = state.geo.locate().await;

    let mut request = NearbyRequest::new(fix.location.latitude, fix.location.longitude);
    if let Some(purpose) = req.purpose {
        request = request.with_purpose(purpose);
    }
    if let Some(top_n) = req.top_n {
        request = request.with_top_n(top_n);
    }
    request
        .validate()
        .map_err(|message| AppError::BadRequest { message })?;

    let recommendations = state.recommender.recommend(request).await?;

    Ok(Json(RecommendResponse {
        location: fix.location,
        approximate_location: fix.is_fallback(),
        recommendations: recommendations.as_ref().clone(),
    }))
}

/// Set the live-mode toggle.
async fn set_mode(
    State(state): State<AppState>,
    Json(req): Json<ModeRequest>,
) -> Json<ModeResponse> {
    let mode = state.set_live_requested(req.live);
    info!(live = req.live, ?mode, "display mode toggled");
    Json(ModeResponse {
        live_requested: req.live,
        mode,
    })
}

/// Forecast and history for one station.
async fn station_overview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StationOverview>, AppError> {
    if !valid_station_id(&id) {
        return Err(AppError::BadRequest {
            message: format!("invalid station id {id:?}"),
        });
    }
    let overview = state.insights.station_overview(&id).await?;
    Ok(Json(overview))
}

/// Ask the server to collect a fresh batch of station data.
async fn collect(State(state): State<AppState>) -> Result<Json<CollectionAck>, AppError> {
    let ack = state.api.trigger_collection().await?;
    info!(message = %ack.message, "data collection triggered");
    Ok(Json(ack))
}
