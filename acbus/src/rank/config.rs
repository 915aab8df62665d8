//! Ranking configuration.

/// Limits applied when ranking stops and arrivals.
#[derive(Debug, Clone)]
pub struct RankConfig {
    /// Number of nearby stops reported to the host.
    pub nearby_count: usize,

    /// Maximum number of arrivals reported to the host.
    pub max_arrivals: usize,

    /// Arrivals further away than this (minutes) are not reported.
    /// The host shows at most two digits.
    pub horizon_mins: i64,
}

impl RankConfig {
    pub fn new(nearby_count: usize, max_arrivals: usize, horizon_mins: i64) -> Self {
        Self {
            nearby_count,
            max_arrivals,
            horizon_mins,
        }
    }
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            nearby_count: 6,
            max_arrivals: 21,
            horizon_mins: 99,
        }
    }
}
