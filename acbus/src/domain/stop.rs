//! Bus stop records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geo::Position;

/// Opaque stop identifier as issued by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(String);

impl StopId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StopId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A bus stop decoded from the stop list.
///
/// `distance_meters` starts out infinite and is filled in once by the
/// proximity ranker.
#[derive(Debug, Clone, PartialEq)]
pub struct StopRecord {
    /// Display name, already transliterated.
    pub name: String,
    pub id: StopId,
    pub position: Position,
    pub distance_meters: f64,
}

impl StopRecord {
    pub fn new(name: impl Into<String>, id: StopId, position: Position) -> Self {
        Self {
            name: name.into(),
            id,
            position,
            distance_meters: f64::INFINITY,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.position.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.position.latitude
    }

    /// Whether the distance has been computed yet.
    pub fn has_distance(&self) -> bool {
        self.distance_meters.is_finite()
    }
}
