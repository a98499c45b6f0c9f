//! Cached per-station forecasts and history.
//!
//! Prediction and trend responses change slowly, so they are cached per
//! `(station, hours)` for a short TTL. Errors are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::api::{ApiError, BikeApi, DEFAULT_PREDICT_HOURS, DEFAULT_TREND_HOURS};
use crate::domain::{Prediction, StationOverview, TrendPoint};

/// Cache key: (station id, hours).
type InsightKey = (String, u32);

#[derive(Debug, Clone)]
pub struct InsightsConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of entries per cache.
    pub max_capacity: u64,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 500,
        }
    }
}

/// Prediction and trend lookups with caching.
pub struct CachedInsights {
    api: BikeApi,
    predictions: MokaCache<InsightKey, Arc<Vec<Prediction>>>,
    trends: MokaCache<InsightKey, Arc<Vec<TrendPoint>>>,
}

impl CachedInsights {
    pub fn new(api: BikeApi, config: &InsightsConfig) -> Self {
        let predictions = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let trends = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            api,
            predictions,
            trends,
        }
    }

    /// Forecast for `station_id` over the next `hours`.
    pub async fn prediction(
        &self,
        station_id: &str,
        hours: u32,
    ) -> Result<Arc<Vec<Prediction>>, ApiError> {
        let key = (station_id.to_string(), hours);
        if let Some(cached) = self.predictions.get(&key).await {
            debug!(station_id, hours, "prediction cache hit");
            return Ok(cached);
        }

        let entry = Arc::new(self.api.station_prediction(station_id, hours).await?);
        self.predictions.insert(key, entry.clone()).await;
        Ok(entry)
    }

    /// History for `station_id` over the last `hours`.
    pub async fn trend(
        &self,
        station_id: &str,
        hours: u32,
    ) -> Result<Arc<Vec<TrendPoint>>, ApiError> {
        let key = (station_id.to_string(), hours);
        if let Some(cached) = self.trends.get(&key).await {
            debug!(station_id, hours, "trend cache hit");
            return Ok(cached);
        }

        let entry = Arc::new(self.api.station_trend(station_id, hours).await?);
        self.trends.insert(key, entry.clone()).await;
        Ok(entry)
    }

    /// Default forecast and history for one station, fetched concurrently.
    pub async fn station_overview(&self, station_id: &str) -> Result<StationOverview, ApiError> {
        let (predictions, trend) = futures::try_join!(
            self.prediction(station_id, DEFAULT_PREDICT_HOURS),
            self.trend(station_id, DEFAULT_TREND_HOURS),
        )?;
        Ok(StationOverview {
            station_id: station_id.to_string(),
            predictions: predictions.as_ref().clone(),
            trend: trend.as_ref().clone(),
        })
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        self.predictions.invalidate_all();
        self.trends.invalidate_all();
    }
}
