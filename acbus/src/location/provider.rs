//! Position providers.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Deserialize;

use crate::domain::Position;

use super::error::LocationError;

/// A position together with the time it was measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub position: Position,
    pub taken_at: DateTime<Utc>,
}

impl Fix {
    pub fn new(position: Position, taken_at: DateTime<Utc>) -> Self {
        Self { position, taken_at }
    }

    /// A fix measured just now.
    pub fn now(position: Position) -> Self {
        Self::new(position, Utc::now())
    }

    /// Time elapsed since the fix was taken. Fixes from the future are zero
    /// seconds old.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.taken_at).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Something that can report where the device is.
///
/// This abstraction lets the locator be tested without positioning hardware.
pub trait LocationProvider: Send + Sync {
    /// Request a single position fix.
    fn locate(&self) -> BoxFuture<'_, Result<Fix, LocationError>>;
}

fn check_finite(position: Position) -> Result<Position, LocationError> {
    if position.is_finite() {
        Ok(position)
    } else {
        Err(LocationError::Invalid(format!(
            "non-finite coordinates {position}"
        )))
    }
}

/// Provider that always reports the same configured position.
#[derive(Debug, Clone, Copy)]
pub struct StaticLocation {
    position: Position,
}

impl StaticLocation {
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

impl LocationProvider for StaticLocation {
    fn locate(&self) -> BoxFuture<'_, Result<Fix, LocationError>> {
        let fix = check_finite(self.position).map(Fix::now);
        Box::pin(async move { fix })
    }
}

/// On-disk fix as written by a positioning daemon.
#[derive(Debug, Deserialize)]
struct FixRecord {
    longitude: f64,
    latitude: f64,
    /// Epoch milliseconds when the fix was taken.
    timestamp: Option<i64>,
}

/// Provider that reads the latest fix from a JSON file.
///
/// The file holds `{"longitude": .., "latitude": .., "timestamp": ..}`.
/// Fixes without a timestamp are treated as taken at read time. Without a
/// freshness limit every fix in the file is accepted; with one, older fixes
/// are rejected as stale.
#[derive(Debug, Clone)]
pub struct FileLocation {
    path: PathBuf,
    max_age: Option<Duration>,
}

impl FileLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_age: None,
        }
    }

    /// Reject fixes older than `max_age`.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    fn read_fix(&self) -> Result<Fix, LocationError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| LocationError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let record: FixRecord =
            serde_json::from_str(&contents).map_err(|e| LocationError::Invalid(e.to_string()))?;

        let position = check_finite(Position::new(record.longitude, record.latitude))?;

        let taken_at = match record.timestamp {
            Some(millis) => DateTime::from_timestamp_millis(millis).ok_or_else(|| {
                LocationError::Invalid(format!("timestamp out of range: {millis}"))
            })?,
            None => Utc::now(),
        };
        let fix = Fix::new(position, taken_at);

        if let Some(max_age) = self.max_age {
            let age = fix.age();
            if age > max_age {
                return Err(LocationError::Stale {
                    age_secs: age.as_secs(),
                    max_age_secs: max_age.as_secs(),
                });
            }
        }

        Ok(fix)
    }
}

impl LocationProvider for FileLocation {
    fn locate(&self) -> BoxFuture<'_, Result<Fix, LocationError>> {
        Box::pin(async move { self.read_fix() })
    }
}
