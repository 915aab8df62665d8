//! Domain types for the nearby-bus pipeline.
//!
//! Records here are created by the feed parsers and ordered by the rankers.
//! None of them outlive a single pipeline run.

mod arrival;
mod geo;
mod names;
mod stop;

pub use arrival::ArrivalRecord;
pub use geo::{EARTH_RADIUS_METERS, MIN_COORDINATE_DEGREES, Position, distance_meters};
pub use names::transliterate;
pub use stop::{StopId, StopRecord};
