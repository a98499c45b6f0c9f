//! User position and planar distance.

use serde::{Deserialize, Serialize};

/// Metres per degree used by the planar distance approximation.
pub const METRES_PER_DEGREE: f64 = 111_000.0;

/// Default map centre (Seoul City Hall), used when no position is known.
pub const DEFAULT_CENTER: UserLocation = UserLocation {
    latitude: 37.5665,
    longitude: 126.9780,
    accuracy: None,
};

/// The user's physical position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in metres, when the platform reports one.
    pub accuracy: Option<f64>,
}

impl UserLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }

    pub fn with_accuracy(mut self, metres: f64) -> Self {
        self.accuracy = Some(metres);
        self
    }

    /// Whether both coordinates are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        valid_coordinates(self.latitude, self.longitude)
    }

    /// Planar distance to a point, in metres. See [`planar_distance_m`].
    pub fn distance_to_m(&self, latitude: f64, longitude: f64) -> f64 {
        planar_distance_m(self.latitude, self.longitude, latitude, longitude)
    }
}

/// Whether a coordinate pair is finite and within WGS84 bounds.
pub fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// Euclidean distance in degrees scaled by 111 km per degree.
///
/// This is a known approximation: it ignores the shrinking of longitude
/// degrees away from the equator, so east-west distances are overstated
/// (by roughly 25% at Seoul's latitude). It is good enough for ordering
/// stations at city scale and is not meant to be geodesically exact.
pub fn planar_distance_m(from_lat: f64, from_lng: f64, to_lat: f64, to_lng: f64) -> f64 {
    let d_lat = to_lat - from_lat;
    let d_lng = to_lng - from_lng;
    (d_lat * d_lat + d_lng * d_lng).sqrt() * METRES_PER_DEGREE
}
