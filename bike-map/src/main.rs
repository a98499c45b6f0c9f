use std::sync::Arc;

use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bike_map::api::{ApiClient, BikeApi, builtin_sample_stations, load_sample_stations};
use bike_map::clock::system_clock;
use bike_map::config::AppConfig;
use bike_map::geo::{ConfiguredPosition, GeoConfig, GeoSession};
use bike_map::health::HealthMonitor;
use bike_map::insights::{CachedInsights, InsightsConfig};
use bike_map::recommend::Recommender;
use bike_map::sync::StationSync;
use bike_map::web::{AppState, create_router, spawn_mode_watcher};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bike_map=info")),
        )
        .init();

    let config = AppConfig::from_env(&DefaultEnv::new())?;

    let client = ApiClient::new(config.api.clone())?;
    info!(base_url = client.base_url(), "using bike-share API");
    let api = BikeApi::new(Arc::new(client));
    let clock = system_clock();

    let fallback = match &config.sample_data {
        Some(path) => load_sample_stations(path).unwrap_or_else(|e| {
            warn!(error = %e, "could not load sample data, using built-in stations");
            builtin_sample_stations()
        }),
        None => builtin_sample_stations(),
    };

    let state = AppState::new(
        api.clone(),
        StationSync::new(api.clone(), clock.clone(), config.sync.clone()),
        HealthMonitor::new(api.clone(), clock, config.health.clone()),
        Recommender::new(api.clone()),
        GeoSession::new(
            Arc::new(ConfiguredPosition::new(config.position)),
            GeoConfig::default(),
        ),
        CachedInsights::new(api, &InsightsConfig::default()),
        fallback,
    );

    state.health.start();
    let watcher = spawn_mode_watcher(state.clone());
    {
        let geo = state.geo.clone();
        tokio::spawn(async move {
            geo.locate().await;
        });
    }

    let app = create_router(state.clone());
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "bike map listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    watcher.abort();
    state.shutdown();
    Ok(())
}
