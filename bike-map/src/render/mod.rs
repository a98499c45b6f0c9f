//! Map rendering composition.
//!
//! Turns synchronizer, location, recommendation and health snapshots into
//! markers and overlays. Holds no state of its own.

mod icon;
mod mode;
mod view;

pub use icon::{USER_COLOR, station_icon, status_color, user_icon};
pub use mode::{DisplayMode, can_use_live, select_mode};
pub use view::{
    DEFAULT_ZOOM, LegendEntry, MapView, PANEL_RECOMMENDATIONS, Panel, PanelEntry, Popup,
    RECOMMENDATION_RADIUS_M, RecommendationOverlay, StationMarker, UserMarker, ViewInputs,
    compose,
};
