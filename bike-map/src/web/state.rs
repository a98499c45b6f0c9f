//! Application state for the web layer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::api::BikeApi;
use crate::domain::Station;
use crate::geo::GeoSession;
use crate::health::HealthMonitor;
use crate::insights::CachedInsights;
use crate::recommend::Recommender;
use crate::render::{DisplayMode, MapView, ViewInputs, compose, select_mode};
use crate::sync::StationSync;

/// Shared application state.
///
/// Cheap to clone; every field is a handle onto the same session.
#[derive(Clone)]
pub struct AppState {
    pub api: BikeApi,
    pub sync: StationSync,
    pub health: HealthMonitor,
    pub recommender: Arc<Recommender>,
    pub geo: Arc<GeoSession>,
    pub insights: Arc<CachedInsights>,
    /// Stations shown while the live feed is unavailable.
    pub fallback: Arc<Vec<Station>>,
    /// The user's live-mode toggle.
    live_requested: Arc<AtomicBool>,
    /// Held while the toggle is read and polling is started or stopped.
    reconciling: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        api: BikeApi,
        sync: StationSync,
        health: HealthMonitor,
        recommender: Recommender,
        geo: GeoSession,
        insights: CachedInsights,
        fallback: Vec<Station>,
    ) -> Self {
        Self {
            api,
            sync,
            health,
            recommender: Arc::new(recommender),
            geo: Arc::new(geo),
            insights: Arc::new(insights),
            fallback: Arc::new(fallback),
            live_requested: Arc::new(AtomicBool::new(true)),
            reconciling: Arc::new(Mutex::new(())),
        }
    }

    pub fn live_requested(&self) -> bool {
        self.live_requested.load(Ordering::SeqCst)
    }

    /// The mode implied by the latest health check and the toggle.
    pub fn mode(&self) -> DisplayMode {
        select_mode(&self.health.snapshot(), self.live_requested())
    }

    /// Set the toggle and bring polling in line with the resulting mode.
    pub fn set_live_requested(&self, live: bool) -> DisplayMode {
        let _reconciling = self.lock_reconcile();
        self.live_requested.store(live, Ordering::SeqCst);
        self.apply_mode()
    }

    /// Poll only while the map is in live mode.
    pub fn reconcile(&self) -> DisplayMode {
        let _reconciling = self.lock_reconcile();
        self.apply_mode()
    }

    fn lock_reconcile(&self) -> MutexGuard<'_, ()> {
        self.reconciling
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_mode(&self) -> DisplayMode {
        let mode = self.mode();
        match mode {
            DisplayMode::Live => {
                if self.sync.start() {
                    info!("switched to live mode");
                }
            }
            DisplayMode::Fallback => {
                if self.sync.is_running() {
                    info!("switched to fallback mode");
                }
                self.sync.stop();
            }
        }
        mode
    }

    /// Compose the current view from every component's latest snapshot.
    pub fn view(&self) -> MapView {
        let sync = self.sync.snapshot();
        let location = self.geo.cached();
        let recommendations = self.recommender.snapshot();
        let health = self.health.snapshot();
        let mode = select_mode(&health, self.live_requested());

        compose(&ViewInputs {
            mode,
            sync: &sync,
            fallback_stations: self.fallback.as_slice(),
            location: location.as_ref(),
            recommendations: &recommendations,
            health: &health,
        })
    }

    /// Tear down every background loop and outstanding request.
    pub fn shutdown(&self) {
        self.sync.stop();
        self.health.stop();
        self.recommender.close();
    }
}

/// Re-evaluate the display mode whenever a health check lands.
///
/// Runs until the returned task is aborted.
pub fn spawn_mode_watcher(state: AppState) -> tokio::task::JoinHandle<()> {
    let mut health = state.health.subscribe();
    tokio::spawn(async move {
        state.reconcile();
        while health.changed().await.is_ok() {
            let status = health.borrow_and_update().status;
            debug!(?status, "health changed, reconciling display mode");
            state.reconcile();
        }
    })
}
