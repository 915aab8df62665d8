//! Device position lookup.
//!
//! Provides the current longitude/latitude for a pipeline run, bounded by a
//! timeout and allowed to reuse a recent fix.

mod error;
mod locator;
mod provider;

pub use error::LocationError;
pub use locator::{GeoLocator, LocatorConfig};
pub use provider::{FileLocation, Fix, LocationProvider, StaticLocation};
