//! Ranking of stops by distance and of arrivals by time.

mod arrivals;
mod config;
mod proximity;

pub use arrivals::{RankedArrival, RankedArrivals, rank_arrivals};
pub use config::RankConfig;
pub use proximity::{NearbyStop, RankError, nearby_stops, rank_by_distance, select_stop};
