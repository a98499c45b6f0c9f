//! Marker colours and SVG icons.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::domain::StationStatus;

/// Colour used for the user's own position and recommendation highlights.
pub const USER_COLOR: &str = "#007bff";

/// Marker colour for a status.
pub fn status_color(status: StationStatus) -> &'static str {
    match status {
        StationStatus::Empty => "#dc3545",
        StationStatus::Low => "#fd7e14",
        StationStatus::Medium => "#0d6efd",
        StationStatus::High => "#198754",
        StationStatus::Unknown => "#6c757d",
    }
}

/// 32×32 station marker showing the bike count on the status colour.
pub fn station_icon(status: StationStatus, bikes: u32) -> String {
    let color = status_color(status);
    data_uri(&format!(
        r##"<svg width="32" height="32" viewBox="0 0 32 32" xmlns="http://www.w3.org/2000/svg"><circle cx="16" cy="16" r="12" fill="{color}" stroke="#fff" stroke-width="2"/><text x="16" y="20" text-anchor="middle" fill="#fff" font-size="10" font-weight="bold">{bikes}</text></svg>"##
    ))
}

/// 24×24 dot marking the user's position.
pub fn user_icon() -> String {
    data_uri(&format!(
        r##"<svg width="24" height="24" viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg"><circle cx="12" cy="12" r="8" fill="{USER_COLOR}" stroke="#fff" stroke-width="2"/><circle cx="12" cy="12" r="3" fill="#fff"/></svg>"##
    ))
}

fn data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}
