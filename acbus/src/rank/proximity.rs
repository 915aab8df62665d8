//! Proximity ranking of bus stops.

use crate::domain::{Position, StopId, StopRecord};

/// Error from stop ranking or selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RankError {
    /// Nothing left after filtering
    #[error("no bus stops available")]
    NoStopsAvailable,

    /// The host asked for a stop that is not in the list
    #[error("requested bus stop {0} not found")]
    RequestedStopNotFound(StopId),
}

/// A stop as reported in the nearby list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearbyStop {
    pub name: String,
    /// Distance rounded to whole meters.
    pub distance_meters: u64,
    pub id: StopId,
}

impl NearbyStop {
    fn from_record(stop: &StopRecord) -> Self {
        Self {
            name: stop.name.clone(),
            distance_meters: stop.distance_meters.round() as u64,
            id: stop.id.clone(),
        }
    }
}

/// Compute each stop's distance from `origin` and sort nearest first.
///
/// Equal distances keep no particular order.
pub fn rank_by_distance(mut stops: Vec<StopRecord>, origin: &Position) -> Vec<StopRecord> {
    for stop in &mut stops {
        stop.distance_meters = origin.distance_to(&stop.position);
    }

    stops.sort_unstable_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    stops
}

/// Pick the stop to query arrivals for.
///
/// Returns the requested stop when given, otherwise the first (nearest) one.
/// `ranked` must already be sorted by [`rank_by_distance`].
pub fn select_stop<'a>(
    ranked: &'a [StopRecord],
    requested: Option<&StopId>,
) -> Result<&'a StopRecord, RankError> {
    let nearest = ranked.first().ok_or(RankError::NoStopsAvailable)?;

    match requested {
        None => Ok(nearest),
        Some(id) => ranked
            .iter()
            .find(|stop| &stop.id == id)
            .ok_or_else(|| RankError::RequestedStopNotFound(id.clone())),
    }
}

/// The `count` nearest stops, nearest first.
pub fn nearby_stops(ranked: &[StopRecord], count: usize) -> Vec<NearbyStop> {
    ranked
        .iter()
        .take(count)
        .map(NearbyStop::from_record)
        .collect()
}
