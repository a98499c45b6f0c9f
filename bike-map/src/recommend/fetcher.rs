//! On-demand recommendation requests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::BikeApi;
use crate::domain::{NearbyRequest, Recommendation, RoutePlan, RouteRequest};

use super::error::RecommendationError;

/// Published recommendation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendationState {
    /// Latest successful nearby results, best first.
    pub recommendations: Arc<Vec<Recommendation>>,
    /// Latest successful route plan.
    pub route: Option<Arc<RoutePlan>>,
    /// At least one request is outstanding.
    pub loading: bool,
    /// Why the most recent request failed.
    pub error: Option<String>,
    /// The user has asked for nearby suggestions at least once.
    pub requested: bool,
}

/// Runs recommendation requests and publishes their results.
///
/// Requests are not deduplicated: overlapping calls each go to the server
/// and whichever completes last is what subscribers see.
pub struct Recommender {
    api: BikeApi,
    state: watch::Sender<RecommendationState>,
    outstanding: AtomicUsize,
    closed: AtomicBool,
}

impl Recommender {
    pub fn new(api: BikeApi) -> Self {
        let (state, _) = watch::channel(RecommendationState::default());
        Self {
            api,
            state,
            outstanding: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RecommendationState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RecommendationState {
        self.state.borrow().clone()
    }

    /// Fetch stations near a position.
    pub async fn recommend(
        &self,
        request: NearbyRequest,
    ) -> Result<Arc<Vec<Recommendation>>, RecommendationError> {
        let _loading = LoadingGuard::enter(self);

        if let Err(message) = request.validate() {
            return Err(self.fail(RecommendationError::new(message)));
        }
        self.publish(|state| state.requested = true);

        debug!(
            latitude = request.latitude,
            longitude = request.longitude,
            purpose = %request.purpose,
            top_n = request.top_n,
            "requesting nearby recommendations"
        );
        match self.api.nearby_recommendations(&request).await {
            Ok(list) => {
                let list = Arc::new(list);
                self.publish(|state| {
                    state.recommendations = list.clone();
                    state.error = None;
                });
                Ok(list)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Fetch departure and arrival suggestions for a trip.
    pub async fn plan_route(
        &self,
        request: RouteRequest,
    ) -> Result<Arc<RoutePlan>, RecommendationError> {
        let _loading = LoadingGuard::enter(self);

        if let Err(message) = request.validate() {
            return Err(self.fail(RecommendationError::new(message)));
        }

        match self.api.route_recommendations(&request).await {
            Ok(plan) => {
                let plan = Arc::new(plan);
                self.publish(|state| {
                    state.route = Some(plan.clone());
                    state.error = None;
                });
                Ok(plan)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Hide the recommendation overlays without discarding results.
    pub fn dismiss(&self) {
        self.publish(|state| state.requested = false);
    }

    /// Tear down: results of requests still in flight are dropped.
    pub fn close(&self) {
        // Set under the channel lock so no publish can straddle it.
        self.state.send_if_modified(|_| {
            self.closed.store(true, Ordering::SeqCst);
            false
        });
    }

    fn fail(&self, err: RecommendationError) -> RecommendationError {
        warn!(error = %err, "recommendation request failed");
        self.publish(|state| state.error = Some(err.message.clone()));
        err
    }

    /// Apply `update` unless closed. The check and the write happen under
    /// the channel lock `close` also takes.
    fn publish(&self, update: impl FnOnce(&mut RecommendationState)) {
        self.state.send_if_modified(|state| {
            if self.closed.load(Ordering::SeqCst) {
                return false;
            }
            update(state);
            true
        });
    }
}

/// Marks a request outstanding; `loading` clears when the last one drops,
/// whether it returned, failed, or was cancelled.
struct LoadingGuard<'a>(&'a Recommender);

impl<'a> LoadingGuard<'a> {
    fn enter(owner: &'a Recommender) -> Self {
        owner.outstanding.fetch_add(1, Ordering::SeqCst);
        owner.publish(|state| state.loading = true);
        Self(owner)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.0.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.publish(|state| state.loading = false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockGateway};
    use crate::domain::Purpose;
    use serde_json::{Value, json};

    const NEARBY: &str = "/api/recommendations/nearby";

    fn rec(id: &str, score: f64) -> Value {
        json!({
            "station_id": id, "station_name": format!("Station {id}"),
            "current_bikes": 4, "distance_km": 0.25,
            "latitude": 37.566, "longitude": 126.977,
            "recommendation_score": score
        })
    }

    fn setup() -> (Arc<MockGateway>, Arc<Recommender>) {
        let mock = Arc::new(MockGateway::new());
        let recommender = Arc::new(Recommender::new(BikeApi::new(mock.clone())));
        (mock, recommender)
    }

    #[tokio::test]
    async fn success_publishes_results() {
        let (mock, recommender) = setup();
        mock.respond_json(NEARBY, json!({"success": true, "data": [rec("1", 0.9), rec("2", 0.7)]}));

        let list = recommender
            .recommend(NearbyRequest::new(37.5665, 126.978))
            .await
            .unwrap();
        assert_eq!(list.len(), 2);

        let state = recommender.snapshot();
        assert_eq!(state.recommendations.len(), 2);
        assert!(state.requested);
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn failure_keeps_previous_results() {
        let (mock, recommender) = setup();
        mock.respond_json(NEARBY, json!({"success": true, "data": [rec("1", 0.9)]}));
        recommender
            .recommend(NearbyRequest::new(37.5665, 126.978))
            .await
            .unwrap();
        let before = recommender.snapshot().recommendations;

        mock.respond_error(NEARBY, ApiError::network("request timed out"));
        let err = recommender
            .recommend(NearbyRequest::new(37.5665, 126.978))
            .await
            .unwrap_err();
        assert!(err.message.contains("timed out"));

        let state = recommender.snapshot();
        assert!(Arc::ptr_eq(&before, &state.recommendations));
        assert!(!state.loading);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn invalid_request_never_hits_network() {
        let (mock, recommender) = setup();

        let err = recommender
            .recommend(NearbyRequest::new(37.5, 127.0).with_top_n(0))
            .await
            .unwrap_err();
        assert_eq!(err.message, "top_n must be at least 1");
        assert!(mock.calls().is_empty());
        let state = recommender.snapshot();
        assert!(!state.loading);
        assert!(!state.requested);
        assert_eq!(state.error.as_deref(), Some("top_n must be at least 1"));
    }

    #[tokio::test]
    async fn later_result_replaces_earlier() {
        let (mock, recommender) = setup();
        mock.respond_json(NEARBY, json!({"success": true, "data": [rec("old", 0.5)]}));
        recommender
            .recommend(NearbyRequest::new(37.5, 127.0))
            .await
            .unwrap();

        mock.respond_json(NEARBY, json!({"success": true, "data": [rec("new", 0.8)]}));
        recommender
            .recommend(NearbyRequest::new(37.5, 127.0).with_purpose(Purpose::Return))
            .await
            .unwrap();

        let state = recommender.snapshot();
        assert_eq!(state.recommendations.len(), 1);
        assert_eq!(state.recommendations[0].station_id, "new");
        let body = mock.calls()[1].body.clone().unwrap();
        assert_eq!(body["purpose"], "return");
    }

    #[tokio::test]
    async fn loading_stays_set_while_any_request_is_outstanding() {
        let (mock, recommender) = setup();
        mock.respond_json(NEARBY, json!({"success": true, "data": []}));
        mock.hold();

        let a = {
            let r = recommender.clone();
            tokio::spawn(async move { r.recommend(NearbyRequest::new(37.5, 127.0)).await })
        };
        let b = {
            let r = recommender.clone();
            tokio::spawn(async move { r.recommend(NearbyRequest::new(37.5, 127.0)).await })
        };
        while mock.in_flight() < 2 {
            tokio::task::yield_now().await;
        }
        assert!(recommender.snapshot().loading);

        mock.release();
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();
        assert!(!recommender.snapshot().loading);
    }

    #[tokio::test]
    async fn cancelled_request_releases_loading() {
        let (mock, recommender) = setup();
        mock.respond_json(NEARBY, json!({"success": true, "data": []}));
        mock.hold();

        let task = {
            let r = recommender.clone();
            tokio::spawn(async move { r.recommend(NearbyRequest::new(37.5, 127.0)).await })
        };
        while mock.in_flight() < 1 {
            tokio::task::yield_now().await;
        }
        task.abort();
        let _ = task.await;

        assert!(!recommender.snapshot().loading);
    }

    #[tokio::test]
    async fn closed_recommender_ignores_late_results() {
        let (mock, recommender) = setup();
        mock.respond_json(NEARBY, json!({"success": true, "data": [rec("1", 0.9)]}));
        mock.hold();

        let task = {
            let r = recommender.clone();
            tokio::spawn(async move { r.recommend(NearbyRequest::new(37.5, 127.0)).await })
        };
        while mock.in_flight() < 1 {
            tokio::task::yield_now().await;
        }
        recommender.close();
        let closed = recommender.snapshot();

        mock.release();
        task.await.unwrap().unwrap();
        assert_eq!(recommender.snapshot(), closed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn nothing_changes_after_close() {
        let (mock, recommender) = setup();
        mock.respond_json(NEARBY, json!({"success": true, "data": [rec("1", 0.9)]}));
        mock.hold();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let r = recommender.clone();
                tokio::spawn(async move { r.recommend(NearbyRequest::new(37.5, 127.0)).await })
            })
            .collect();
        while mock.in_flight() < 8 {
            tokio::task::yield_now().await;
        }

        let mut rx = recommender.subscribe();
        let release = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.release() })
        };
        recommender.close();
        let closed = recommender.snapshot();

        release.await.unwrap();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(recommender.snapshot(), closed);

        // A request made after close cannot publish either.
        let before = rx.borrow_and_update().clone();
        recommender
            .recommend(NearbyRequest::new(37.5, 127.0))
            .await
            .unwrap();
        assert!(!rx.has_changed().unwrap());
        assert_eq!(recommender.snapshot(), before);
    }

    #[tokio::test]
    async fn route_plan_is_published() {
        let (mock, recommender) = setup();
        mock.respond_json(
            "/api/recommendations/route",
            json!({"success": true, "data": {
                "departure_stations": [rec("1", 0.9)],
                "arrival_stations": [rec("2", 0.6)],
                "route_info": {
                    "total_distance_km": 3.2,
                    "estimated_bike_time_minutes": 12,
                    "generated_at": "2026-10-16 09:00:00"
                }
            }}),
        );

        let plan = recommender
            .plan_route(RouteRequest {
                start_latitude: 37.5665,
                start_longitude: 126.978,
                end_latitude: 37.5547,
                end_longitude: 126.9707,
            })
            .await
            .unwrap();
        assert_eq!(plan.route_info.estimated_bike_time_minutes, 12);
        assert_eq!(recommender.snapshot().route, Some(plan));
    }
}
