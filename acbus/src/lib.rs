//! Nearby-bus companion backend.
//!
//! Answers the watch app's question: "Which bus stops are near me, and what
//! leaves from the closest one in the next hour or so?"

pub mod domain;
pub mod feed;
pub mod host;
pub mod location;
pub mod pipeline;
pub mod rank;
