//! Host-facing message schema.
//!
//! The host (the watch app) sends [`HostRequest`]s and renders the two text
//! fields of a [`HostReply`]. How messages travel between the two is not
//! handled here.

mod format;
mod message;

pub use format::{FIELD_SEPARATOR, format_bus_data, format_bus_stop_data};
pub use message::{HostReply, HostRequest};
