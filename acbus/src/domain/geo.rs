//! Geographic positions and great-circle distances.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for haversine distances, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Coordinates at or below this magnitude (degrees) are treated as "no data".
///
/// The feed lists many stops at `(0, 0)`; those rows are placeholders rather
/// than real positions.
pub const MIN_COORDINATE_DEGREES: f64 = 0.1;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

impl Position {
    /// Create a position from longitude and latitude (in that order).
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Whether either coordinate is within the placeholder band around zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use acbus::domain::Position;
    ///
    /// assert!(Position::new(0.0, 0.0).is_placeholder());
    /// assert!(Position::new(6.09, 0.05).is_placeholder());
    /// assert!(!Position::new(6.09, 50.78).is_placeholder());
    /// ```
    pub fn is_placeholder(&self) -> bool {
        self.longitude.abs() <= MIN_COORDINATE_DEGREES
            || self.latitude.abs() <= MIN_COORDINATE_DEGREES
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Position) -> f64 {
        distance_meters(self, other)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.longitude, self.latitude)
    }
}

/// Haversine distance between two positions, in meters.
///
/// Deltas enter the formula through their absolute value, so the result is
/// bit-for-bit symmetric in its arguments.
pub fn distance_meters(a: &Position, b: &Position) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).abs().to_radians();
    let delta_lambda = (b.longitude - a.longitude).abs().to_radians();

    let sin_phi = (delta_phi / 2.0).sin();
    let sin_lambda = (delta_lambda / 2.0).sin();
    let h = (sin_phi * sin_phi + phi1.cos() * phi2.cos() * sin_lambda * sin_lambda).min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}
