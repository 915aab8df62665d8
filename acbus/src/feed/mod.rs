//! Real-time transit feed access.
//!
//! This module talks to a URA "instant" interface, which answers plain HTTP
//! GET requests with one bracketed CSV record per line.
//!
//! Key characteristics of the interface:
//! - The `ReturnList` parameter selects fields, but rows always list them in
//!   the interface's canonical order (see [`FieldLayout`])
//! - Row 0 is a version row carrying the server clock in epoch milliseconds
//! - Stops without a known position are reported at `(0, 0)`

mod client;
mod error;
mod fields;
mod mock;
mod parse;
mod rows;

use futures::future::BoxFuture;

use crate::domain::StopId;

pub use client::{FeedClient, FeedConfig};
pub use error::FeedError;
pub use fields::{ARRIVAL_FIELDS, Field, FieldLayout, STOP_FIELDS, return_list};
pub use mock::MockFeedClient;
pub use parse::{parse_arrivals, parse_stops};
pub use rows::{Row, RowError};

/// Source of raw feed bodies.
///
/// This abstraction lets the pipeline run against the live interface or
/// against canned data.
pub trait FeedSource: Send + Sync {
    /// Column layout of stop-list bodies from this source.
    fn stop_layout(&self) -> &FieldLayout;

    /// Column layout of arrivals bodies from this source.
    fn arrival_layout(&self) -> &FieldLayout;

    /// Fetch the full stop list.
    fn stops_body(&self) -> BoxFuture<'_, Result<String, FeedError>>;

    /// Fetch the upcoming arrivals at one stop.
    fn arrivals_body<'a>(&'a self, stop_id: &'a StopId)
    -> BoxFuture<'a, Result<String, FeedError>>;
}
