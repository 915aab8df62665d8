//! Geo locator: one bounded position request per pipeline run.
//!
//! Mirrors the platform geolocation contract: a request gives up after
//! `timeout`, and a fix younger than `max_age` may be served again instead
//! of asking the provider.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::Position;

use super::error::LocationError;
use super::provider::{Fix, LocationProvider};

/// Configuration for the locator.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Maximum time to wait for a fix.
    pub timeout: Duration,

    /// Oldest fix that may be reused, measured from when it was taken.
    pub max_age: Duration,
}

impl LocatorConfig {
    pub fn new(timeout: Duration, max_age: Duration) -> Self {
        Self { timeout, max_age }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_age: Duration::from_secs(60),
        }
    }
}

/// Locator wrapping a provider with a timeout and a fix cache.
#[derive(Clone)]
pub struct GeoLocator {
    provider: Arc<dyn LocationProvider>,
    timeout: Duration,
    max_age: Duration,
    /// Last fix. `None` when reuse is disabled.
    last_fix: Option<MokaCache<(), Fix>>,
}

impl GeoLocator {
    pub fn new(provider: Arc<dyn LocationProvider>, config: &LocatorConfig) -> Self {
        // The TTL only bounds memory; reuse is decided by the fix's own age.
        let last_fix = (!config.max_age.is_zero()).then(|| {
            MokaCache::builder()
                .time_to_live(config.max_age)
                .max_capacity(1)
                .build()
        });

        Self {
            provider,
            timeout: config.timeout,
            max_age: config.max_age,
            last_fix,
        }
    }

    /// Current position, from a recent fix or a fresh provider request.
    pub async fn current_position(&self) -> Result<Position, LocationError> {
        if let Some(cache) = &self.last_fix
            && let Some(fix) = cache.get(&()).await
        {
            let age = fix.age();
            if age <= self.max_age {
                debug!(
                    position = %fix.position,
                    age_ms = age.as_millis() as u64,
                    "reusing recent position fix"
                );
                return Ok(fix.position);
            }
            cache.invalidate(&()).await;
        }

        let fix = tokio::time::timeout(self.timeout, self.provider.locate())
            .await
            .map_err(|_| LocationError::Timeout(self.timeout))??;

        debug!(position = %fix.position, taken_at = %fix.taken_at, "new position fix");

        if let Some(cache) = &self.last_fix
            && fix.age() < self.max_age
        {
            cache.insert((), fix).await;
        }

        Ok(fix.position)
    }

    /// Drop the remembered fix so the next request asks the provider.
    pub fn forget(&self) {
        if let Some(cache) = &self.last_fix {
            cache.invalidate_all();
        }
    }
}
