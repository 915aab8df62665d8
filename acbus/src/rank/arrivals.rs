//! Ordering and truncation of upcoming arrivals.

use tracing::trace;

use crate::domain::ArrivalRecord;

use super::config::RankConfig;

/// An arrival as reported to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedArrival {
    pub line_number: String,
    pub destination: String,
    pub eta_minutes: i64,
}

/// Arrivals selected for display, soonest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedArrivals {
    pub entries: Vec<RankedArrival>,
}

impl RankedArrivals {
    /// Number of included arrivals.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sort arrivals by ETA, keep at most `max_arrivals`, and stop at the first
/// one beyond the horizon.
pub fn rank_arrivals(mut arrivals: Vec<ArrivalRecord>, config: &RankConfig) -> RankedArrivals {
    arrivals.sort_by_key(|a| a.eta_offset_millis);

    let entries = arrivals
        .into_iter()
        .take(config.max_arrivals)
        .map(|a| RankedArrival {
            eta_minutes: a.eta_minutes(),
            line_number: a.line_number,
            destination: a.destination,
        })
        .take_while(|a| {
            let within = a.eta_minutes <= config.horizon_mins;
            if !within {
                trace!(line = %a.line_number, eta = a.eta_minutes, "arrival beyond horizon");
            }
            within
        })
        .collect();

    RankedArrivals { entries }
}
