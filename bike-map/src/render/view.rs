//! Compose synchronized state into a display-ready map view.
//!
//! Everything here is a pure function of its inputs: no network calls and
//! no writes to any component's state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    DEFAULT_CENTER, HealthStatus, Recommendation, Station, StationStatus, UserLocation,
};
use crate::geo::GeoFix;
use crate::recommend::RecommendationState;
use crate::sync::SyncState;

use super::icon::{USER_COLOR, station_icon, status_color, user_icon};
use super::mode::DisplayMode;

/// Initial zoom level of the map.
pub const DEFAULT_ZOOM: u8 = 13;

/// Radius of the highlight drawn around each recommended station.
pub const RECOMMENDATION_RADIUS_M: f64 = 200.0;

/// How many recommendations the side panel lists.
pub const PANEL_RECOMMENDATIONS: usize = 5;

/// Everything [`compose`] reads.
pub struct ViewInputs<'a> {
    pub mode: DisplayMode,
    pub sync: &'a SyncState,
    /// Stations shown in fallback mode.
    pub fallback_stations: &'a [Station],
    pub location: Option<&'a GeoFix>,
    pub recommendations: &'a RecommendationState,
    pub health: &'a HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub mode: DisplayMode,
    pub center: UserLocation,
    pub zoom: u8,
    pub user: Option<UserMarker>,
    pub stations: Vec<StationMarker>,
    pub overlays: Vec<RecommendationOverlay>,
    pub panel: Panel,
    pub legend: Vec<LegendEntry>,
    pub health: HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub icon: String,
    /// Reported accuracy, rounded to whole metres.
    pub accuracy_m: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMarker {
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: StationStatus,
    pub color: &'static str,
    pub icon: String,
    pub tooltip: String,
    pub popup: Popup,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub title: String,
    pub bikes: u32,
    pub racks: u32,
    /// One-decimal percentage, or `n/a` for a station without racks.
    pub availability: String,
    pub status_label: &'static str,
    /// Planar distance from the user, when their position is known.
    pub distance_m: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationOverlay {
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelEntry {
    pub rank: usize,
    pub station_name: String,
    pub current_bikes: u32,
    pub distance_km: f64,
    /// Score out of 100.
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    /// A station fetch is in flight.
    pub loading: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_updated_text: String,
    /// Last station fetch error.
    pub error: Option<String>,
    /// Offer a manual retry.
    pub retry: bool,
    pub recommending: bool,
    pub recommendation_error: Option<String>,
    pub recommendations: Vec<PanelEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub status: StationStatus,
    pub color: &'static str,
    pub label: &'static str,
}

/// Build the map view for one frame.
pub fn compose(inputs: &ViewInputs<'_>) -> MapView {
    // A fallback fix only recentres the map; it is not the user's position.
    let user_position = inputs
        .location
        .filter(|fix| !fix.is_fallback())
        .map(|fix| fix.location);
    let center = inputs
        .location
        .map(|fix| fix.location)
        .unwrap_or(DEFAULT_CENTER);

    let stations: &[Station] = match inputs.mode {
        DisplayMode::Live => inputs.sync.stations.as_slice(),
        DisplayMode::Fallback => inputs.fallback_stations,
    };

    let rec = inputs.recommendations;
    let overlays = if rec.requested {
        rec.recommendations.iter().map(overlay).collect()
    } else {
        Vec::new()
    };

    MapView {
        mode: inputs.mode,
        center,
        zoom: DEFAULT_ZOOM,
        user: user_position.map(|loc| UserMarker {
            latitude: loc.latitude,
            longitude: loc.longitude,
            icon: user_icon(),
            accuracy_m: loc.accuracy.map(|a| a.round() as u64),
        }),
        stations: stations
            .iter()
            .map(|s| station_marker(s, user_position.as_ref()))
            .collect(),
        overlays,
        panel: panel(inputs),
        legend: legend(),
        health: inputs.health.clone(),
    }
}

fn station_marker(station: &Station, user: Option<&UserLocation>) -> StationMarker {
    StationMarker {
        station_id: station.station_id.clone(),
        latitude: station.latitude,
        longitude: station.longitude,
        status: station.status,
        color: status_color(station.status),
        icon: station_icon(station.status, station.parking_bike_tot_cnt),
        tooltip: format!("{}: {}", station.station_name, station.parking_bike_tot_cnt),
        popup: Popup {
            title: station.station_name.clone(),
            bikes: station.parking_bike_tot_cnt,
            racks: station.rack_tot_cnt,
            availability: station
                .availability_percent()
                .unwrap_or_else(|| "n/a".to_string()),
            status_label: station.status.label(),
            distance_m: user
                .map(|u| u.distance_to_m(station.latitude, station.longitude).round() as u64),
        },
    }
}

fn overlay(rec: &Recommendation) -> RecommendationOverlay {
    RecommendationOverlay {
        station_id: rec.station_id.clone(),
        latitude: rec.latitude,
        longitude: rec.longitude,
        radius_m: RECOMMENDATION_RADIUS_M,
        color: USER_COLOR,
    }
}

fn panel(inputs: &ViewInputs<'_>) -> Panel {
    let rec = inputs.recommendations;
    let recommendations = if rec.requested {
        rec.recommendations
            .iter()
            .take(PANEL_RECOMMENDATIONS)
            .enumerate()
            .map(|(i, r)| PanelEntry {
                rank: i + 1,
                station_name: r.station_name.clone(),
                current_bikes: r.current_bikes,
                distance_km: r.distance_km,
                score: r.score_points(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let (loading, last_updated, error) = match inputs.mode {
        DisplayMode::Live => (
            inputs.sync.loading,
            inputs.sync.last_updated,
            inputs.sync.error.clone(),
        ),
        DisplayMode::Fallback => (false, None, None),
    };
    let last_updated_text = match (inputs.mode, last_updated) {
        (DisplayMode::Fallback, _) => "Showing sample data".to_string(),
        (DisplayMode::Live, Some(at)) => format!("Last updated {}", at.format("%H:%M:%S")),
        (DisplayMode::Live, None) => "Not updated yet".to_string(),
    };

    Panel {
        loading,
        last_updated,
        last_updated_text,
        retry: error.is_some(),
        error,
        recommending: rec.loading,
        recommendation_error: rec.error.clone(),
        recommendations,
    }
}

fn legend() -> Vec<LegendEntry> {
    StationStatus::ALL
        .iter()
        .filter(|s| **s != StationStatus::Unknown)
        .map(|&status| LegendEntry {
            status,
            color: status_color(status),
            label: status.label(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn stations() -> Vec<Station> {
        vec![
            Station::new("ST-1", "City Hall", 0, 10, 37.5665, 126.978),
            Station::new("ST-2", "Myeongdong", 9, 10, 37.5636, 126.9869),
            Station::new("ST-3", "Closed", 0, 0, 37.57, 126.98),
        ]
    }

    fn rec(id: &str, score: f64) -> Recommendation {
        Recommendation {
            station_id: id.to_string(),
            station_name: format!("Station {id}"),
            current_bikes: 5,
            distance_km: 0.3,
            latitude: 37.566,
            longitude: 126.979,
            recommendation_score: score,
            total_racks: None,
            availability_rate: None,
            walking_time_minutes: None,
            status: None,
        }
    }

    struct Fixture {
        sync: SyncState,
        fallback: Vec<Station>,
        recs: RecommendationState,
        health: HealthStatus,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                sync: SyncState {
                    stations: Arc::new(stations()),
                    last_updated: Some(Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 5).unwrap()),
                    ..SyncState::default()
                },
                fallback: vec![Station::new("S-1", "Sample", 3, 10, 37.55, 126.97)],
                recs: RecommendationState::default(),
                health: HealthStatus::default(),
            }
        }

        fn view(&self, mode: DisplayMode, location: Option<&GeoFix>) -> MapView {
            compose(&ViewInputs {
                mode,
                sync: &self.sync,
                fallback_stations: &self.fallback,
                location,
                recommendations: &self.recs,
                health: &self.health,
            })
        }
    }

    #[test]
    fn live_view_marks_every_station() {
        let fixture = Fixture::new();
        let view = fixture.view(DisplayMode::Live, None);

        assert_eq!(view.stations.len(), 3);
        assert_eq!(view.zoom, DEFAULT_ZOOM);
        assert_eq!(view.center, DEFAULT_CENTER);
        assert!(view.user.is_none());

        let empty = &view.stations[0];
        assert_eq!(empty.color, "#dc3545");
        assert_eq!(empty.tooltip, "City Hall: 0");
        assert_eq!(empty.popup.availability, "0.0%");
        assert_eq!(empty.popup.distance_m, None);

        let closed = &view.stations[2];
        assert_eq!(closed.status, StationStatus::Unknown);
        assert_eq!(closed.popup.availability, "n/a");

        assert_eq!(view.panel.last_updated_text, "Last updated 09:30:05");
        assert!(!view.panel.retry);
    }

    #[test]
    fn user_location_adds_marker_and_distances() {
        let fixture = Fixture::new();
        let fix = GeoFix {
            location: UserLocation::new(37.5665, 126.978).with_accuracy(14.6),
            error: None,
        };
        let view = fixture.view(DisplayMode::Live, Some(&fix));

        let user = view.user.unwrap();
        assert_eq!(user.accuracy_m, Some(15));
        assert_eq!(view.center, fix.location);
        assert_eq!(view.stations[0].popup.distance_m, Some(0));
        // 0.0001 degrees of latitude is 11.1 m under the planar estimate.
        let near = Station::new("N", "Near", 1, 2, 37.5666, 126.978);
        let marker = station_marker(&near, Some(&fix.location));
        assert_eq!(marker.popup.distance_m, Some(11));
    }

    #[test]
    fn fallback_fix_recentres_without_user_marker() {
        let fixture = Fixture::new();
        let fix = GeoFix {
            location: DEFAULT_CENTER,
            error: Some("permission denied".to_string()),
        };
        let view = fixture.view(DisplayMode::Live, Some(&fix));
        assert!(view.user.is_none());
        assert_eq!(view.center, DEFAULT_CENTER);
        assert!(view.stations.iter().all(|s| s.popup.distance_m.is_none()));
    }

    #[test]
    fn fallback_mode_uses_sample_stations() {
        let mut fixture = Fixture::new();
        fixture.sync.error = Some("network error: timed out".to_string());
        let view = fixture.view(DisplayMode::Fallback, None);

        assert_eq!(view.stations.len(), 1);
        assert_eq!(view.stations[0].station_id, "S-1");
        assert_eq!(view.panel.error, None);
        assert_eq!(view.panel.last_updated_text, "Showing sample data");
    }

    #[test]
    fn sync_error_offers_retry_and_keeps_stations() {
        let mut fixture = Fixture::new();
        fixture.sync.error = Some("network error: timed out".to_string());
        let view = fixture.view(DisplayMode::Live, None);

        assert!(view.panel.retry);
        assert_eq!(view.stations.len(), 3);
    }

    #[test]
    fn recommendations_shown_only_when_requested() {
        let mut fixture = Fixture::new();
        fixture.recs.recommendations =
            Arc::new((0..7).map(|i| rec(&i.to_string(), 0.9 - i as f64 * 0.1)).collect());

        let hidden = fixture.view(DisplayMode::Live, None);
        assert!(hidden.overlays.is_empty());
        assert!(hidden.panel.recommendations.is_empty());

        fixture.recs.requested = true;
        let shown = fixture.view(DisplayMode::Live, None);
        assert_eq!(shown.overlays.len(), 7);
        assert_eq!(shown.overlays[0].radius_m, RECOMMENDATION_RADIUS_M);
        assert_eq!(shown.panel.recommendations.len(), PANEL_RECOMMENDATIONS);
        assert_eq!(shown.panel.recommendations[0].rank, 1);
        assert_eq!(shown.panel.recommendations[0].score, 90);
    }

    #[test]
    fn legend_lists_known_statuses() {
        let legend = legend();
        assert_eq!(legend.len(), 4);
        assert_eq!(legend[0].status, StationStatus::Empty);
        assert_eq!(legend[3].color, "#198754");
    }
}
