//! Typed endpoints over a [`Gateway`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{
    NearbyRequest, Prediction, Recommendation, RoutePlan, RouteRequest, Station, TrendPoint,
    valid_station_id,
};

use super::client::Gateway;
use super::convert::convert_station_rows;
use super::error::ApiError;
use super::types::{CollectionAck, Envelope, HealthResponse, StationRow};

/// Default forecast horizon for predictions, in hours.
pub const DEFAULT_PREDICT_HOURS: u32 = 2;

/// Default history window for trends, in hours.
pub const DEFAULT_TREND_HOURS: u32 = 24;

/// Typed client for the bike-share API.
///
/// Cheap to clone; all clones share the same gateway.
#[derive(Clone)]
pub struct BikeApi {
    gateway: Arc<dyn Gateway>,
}

impl BikeApi {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let value = self.gateway.get("/health", &[]).await?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::validation(format!("health response: {e}")))
    }

    /// `GET /api/stations/realtime`, converted and classified.
    pub async fn realtime_stations(&self) -> Result<Vec<Station>, ApiError> {
        let value = self.gateway.get("/api/stations/realtime", &[]).await?;
        let rows: Vec<StationRow> = unwrap_envelope(value)?;
        Ok(convert_station_rows(&rows))
    }

    /// `POST /api/recommendations/nearby`.
    pub async fn nearby_recommendations(
        &self,
        request: &NearbyRequest,
    ) -> Result<Vec<Recommendation>, ApiError> {
        let body = to_body(request)?;
        let value = self
            .gateway
            .post("/api/recommendations/nearby", Some(body))
            .await?;
        unwrap_envelope(value)
    }

    /// `POST /api/recommendations/route`.
    pub async fn route_recommendations(
        &self,
        request: &RouteRequest,
    ) -> Result<RoutePlan, ApiError> {
        let body = to_body(request)?;
        let value = self
            .gateway
            .post("/api/recommendations/route", Some(body))
            .await?;
        unwrap_envelope(value)
    }

    /// `GET /api/stations/{id}/predict?hours=N`.
    pub async fn station_prediction(
        &self,
        station_id: &str,
        hours: u32,
    ) -> Result<Vec<Prediction>, ApiError> {
        let path = station_path(station_id, "predict")?;
        let value = self
            .gateway
            .get(&path, &[("hours", hours.to_string())])
            .await?;
        unwrap_envelope(value)
    }

    /// `GET /api/stations/{id}/trend?hours=N`.
    pub async fn station_trend(
        &self,
        station_id: &str,
        hours: u32,
    ) -> Result<Vec<TrendPoint>, ApiError> {
        let path = station_path(station_id, "trend")?;
        let value = self
            .gateway
            .get(&path, &[("hours", hours.to_string())])
            .await?;
        unwrap_envelope(value)
    }

    /// `POST /api/data/collect`.
    ///
    /// The server acknowledges with a message at the envelope's top level
    /// rather than under `data`.
    pub async fn trigger_collection(&self) -> Result<CollectionAck, ApiError> {
        let value = self.gateway.post("/api/data/collect", None).await?;
        let envelope: Envelope<Value> = parse(value.clone())?;
        if !envelope.success {
            return Err(failure(envelope.message));
        }
        serde_json::from_value(value)
            .map_err(|e| ApiError::validation(format!("collection response: {e}")))
    }
}

/// `/api/stations/{id}/{leaf}`, refusing ids that would escape their segment.
fn station_path(station_id: &str, leaf: &str) -> Result<String, ApiError> {
    if !valid_station_id(station_id) {
        return Err(ApiError::validation(format!(
            "invalid station id {station_id:?}"
        )));
    }
    Ok(format!("/api/stations/{station_id}/{leaf}"))
}

fn to_body<T: serde::Serialize>(request: &T) -> Result<Value, ApiError> {
    serde_json::to_value(request).map_err(|e| ApiError::validation(format!("request body: {e}")))
}

fn parse<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::validation(e.to_string()))
}

fn failure(message: Option<String>) -> ApiError {
    ApiError::validation(message.unwrap_or_else(|| "server reported failure".to_string()))
}

/// Check `success` and pull out `data`.
fn unwrap_envelope<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    let envelope: Envelope<T> = parse(value)?;
    if !envelope.success {
        return Err(failure(envelope.message));
    }
    envelope
        .data
        .ok_or_else(|| ApiError::validation("missing data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockGateway;
    use crate::domain::StationStatus;
    use serde_json::json;

    fn api_with(mock: &Arc<MockGateway>) -> BikeApi {
        BikeApi::new(mock.clone())
    }

    #[tokio::test]
    async fn realtime_stations_are_classified() {
        let mock = Arc::new(MockGateway::new());
        mock.respond_json(
            "/api/stations/realtime",
            json!({
                "success": true,
                "data": [
                    {"stationId": "1", "stationName": "A", "parkingBikeTotCnt": 0,
                     "rackTotCnt": 15, "stationLatitude": "37.5", "stationLongitude": "127.0",
                     "shared": 0},
                    {"stationId": "2", "stationName": "B", "parkingBikeTotCnt": 12,
                     "rackTotCnt": 15, "stationLatitude": "37.6", "stationLongitude": "127.1",
                     "shared": 80}
                ]
            }),
        );

        let stations = api_with(&mock).realtime_stations().await.unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].status, StationStatus::Empty);
        assert_eq!(stations[1].status, StationStatus::High);
        assert_eq!(stations[1].latitude, 37.6);
    }

    #[tokio::test]
    async fn missing_data_is_validation_error() {
        let mock = Arc::new(MockGateway::new());
        mock.respond_json("/api/stations/realtime", json!({"success": true}));

        let err = api_with(&mock).realtime_stations().await.unwrap_err();
        assert_eq!(err, ApiError::validation("missing data"));
    }

    #[tokio::test]
    async fn unsuccessful_envelope_carries_message() {
        let mock = Arc::new(MockGateway::new());
        mock.respond_json(
            "/api/stations/realtime",
            json!({"success": false, "message": "upstream unavailable"}),
        );

        let err = api_with(&mock).realtime_stations().await.unwrap_err();
        assert_eq!(err, ApiError::validation("upstream unavailable"));
    }

    #[tokio::test]
    async fn network_errors_pass_through() {
        let mock = Arc::new(MockGateway::new());
        mock.respond_error("/api/stations/realtime", ApiError::http(500, "boom"));

        let err = api_with(&mock).realtime_stations().await.unwrap_err();
        assert_eq!(err.http_status(), Some(500));
    }

    #[tokio::test]
    async fn nearby_posts_request_body() {
        let mock = Arc::new(MockGateway::new());
        mock.respond_json(
            "/api/recommendations/nearby",
            json!({"success": true, "data": [{
                "station_id": "7", "station_name": "City Hall", "current_bikes": 5,
                "distance_km": 0.3, "latitude": 37.566, "longitude": 126.977,
                "recommendation_score": 0.9
            }]}),
        );

        let request = NearbyRequest::new(37.5665, 126.978).with_top_n(3);
        let recs = api_with(&mock).nearby_recommendations(&request).await.unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].station_id, "7");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].body.as_ref().unwrap()["top_n"], 3);
        assert_eq!(calls[0].body.as_ref().unwrap()["purpose"], "rental");
    }

    #[tokio::test]
    async fn prediction_passes_hours() {
        let mock = Arc::new(MockGateway::new());
        mock.respond_json(
            "/api/stations/ST-1/predict",
            json!({"success": true, "station_id": "ST-1", "data": [{
                "station_id": "ST-1", "station_name": "A",
                "predicted_time": "2026-10-16 18:00:00", "hours_ahead": 1,
                "predicted_bikes": 4, "current_bikes": 6, "total_racks": 10,
                "predicted_availability": 0.4
            }]}),
        );

        let preds = api_with(&mock)
            .station_prediction("ST-1", DEFAULT_PREDICT_HOURS)
            .await
            .unwrap();
        assert_eq!(preds[0].predicted_bikes, 4);
        assert_eq!(
            mock.calls()[0].params,
            vec![("hours".to_string(), "2".to_string())]
        );
    }

    #[tokio::test]
    async fn collection_ack_reads_top_level_message() {
        let mock = Arc::new(MockGateway::new());
        mock.respond_json(
            "/api/data/collect",
            json!({"success": true, "message": "collected 2700 stations",
                   "collected_at": "2026-10-16T12:00:00"}),
        );

        let ack = api_with(&mock).trigger_collection().await.unwrap();
        assert_eq!(ack.message, "collected 2700 stations");
        assert_eq!(ack.collected_at.as_deref(), Some("2026-10-16T12:00:00"));
    }

    #[tokio::test]
    async fn health_parses_status() {
        let mock = Arc::new(MockGateway::new());
        mock.respond_json("/health", json!({"status": "healthy"}));

        let health = api_with(&mock).health().await.unwrap();
        assert_eq!(health.status, "healthy");
    }

    #[tokio::test]
    async fn hostile_station_id_never_reaches_gateway() {
        let mock = Arc::new(MockGateway::new());
        let api = api_with(&mock);

        let err = api
            .station_prediction("../../data/collect?x=", 2)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
        assert!(api.station_trend("..", 24).await.is_err());
        assert!(api.station_trend("a#b", 24).await.is_err());
        assert!(mock.calls().is_empty());
    }
}
