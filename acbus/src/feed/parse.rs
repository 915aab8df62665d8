//! Decoding of stop-list and arrivals bodies into domain records.
//!
//! Row 0 of every body is the interface's version row, e.g.
//! `[4,"1.0",1449239766000]`; its third cell is the server's clock in epoch
//! milliseconds. Bad data rows are logged and skipped one by one.

use tracing::{debug, trace};

use crate::domain::{ArrivalRecord, Position, StopId, StopRecord, transliterate};

use super::error::FeedError;
use super::fields::{Field, FieldLayout};
use super::rows::{Row, RowError, lines};

/// Column of the version row that carries the reference time.
const REFERENCE_TIME_COLUMN: usize = 2;

fn column(layout: &FieldLayout, field: Field) -> Result<usize, FeedError> {
    layout.column(field).ok_or(FeedError::MissingField(field))
}

/// Column indices needed to build a [`StopRecord`].
struct StopColumns {
    name: usize,
    id: usize,
    longitude: usize,
    latitude: usize,
    width: usize,
}

impl StopColumns {
    fn resolve(layout: &FieldLayout) -> Result<Self, FeedError> {
        Ok(Self {
            name: column(layout, Field::StopPointName)?,
            id: column(layout, Field::StopId)?,
            longitude: column(layout, Field::Longitude)?,
            latitude: column(layout, Field::Latitude)?,
            width: layout.width(),
        })
    }

    fn decode(&self, row: &Row) -> Result<StopRecord, RowError> {
        row.require_width(self.width)?;
        let position = Position::new(row.float(self.longitude)?, row.float(self.latitude)?);
        Ok(StopRecord::new(
            transliterate(row.text(self.name)?),
            StopId::new(row.text(self.id)?),
            position,
        ))
    }
}

/// Parse the stop-list body.
///
/// Stops at placeholder coordinates are dropped. Input order is preserved.
/// A body without even the version row is malformed.
pub fn parse_stops(body: &str, layout: &FieldLayout) -> Result<Vec<StopRecord>, FeedError> {
    let columns = StopColumns::resolve(layout)?;

    let mut rows = lines(body);
    if rows.next().is_none() {
        return Err(FeedError::Malformed("empty stop list body".to_string()));
    }

    let mut stops = Vec::new();
    let mut placeholders = 0usize;

    for (index, line) in rows.enumerate() {
        let stop = match Row::decode(line).and_then(|row| columns.decode(&row)) {
            Ok(stop) => stop,
            Err(e) => {
                debug!(row = index + 1, error = %e, "skipping stop row");
                continue;
            }
        };

        if stop.position.is_placeholder() {
            placeholders += 1;
            trace!(id = %stop.id, "skipping stop at placeholder coordinates");
            continue;
        }

        stops.push(stop);
    }

    debug!(count = stops.len(), placeholders, "parsed bus stops");
    Ok(stops)
}

/// Column indices needed to build an [`ArrivalRecord`].
struct ArrivalColumns {
    line: usize,
    destination: usize,
    estimated_time: usize,
    width: usize,
}

impl ArrivalColumns {
    fn resolve(layout: &FieldLayout) -> Result<Self, FeedError> {
        Ok(Self {
            line: column(layout, Field::LineName)?,
            destination: column(layout, Field::DestinationName)?,
            estimated_time: column(layout, Field::EstimatedTime)?,
            width: layout.width(),
        })
    }

    fn decode(&self, row: &Row, reference_millis: i64) -> Result<ArrivalRecord, RowError> {
        row.require_width(self.width)?;
        Ok(ArrivalRecord::new(
            transliterate(row.text(self.line)?),
            transliterate(row.text(self.destination)?),
            row.integer(self.estimated_time)?,
            reference_millis,
        ))
    }
}

/// Read the reference time from the version row.
fn reference_time(line: &str) -> Result<i64, RowError> {
    Row::decode(line)?.integer(REFERENCE_TIME_COLUMN)
}

/// Parse the arrivals body for one stop.
///
/// An empty body, or one whose version row carries no usable reference
/// time, yields no arrivals rather than an error. Only a field list that
/// lacks a required field is an error.
pub fn parse_arrivals(body: &str, layout: &FieldLayout) -> Result<Vec<ArrivalRecord>, FeedError> {
    let columns = ArrivalColumns::resolve(layout)?;

    let mut rows = lines(body);
    let Some(header) = rows.next() else {
        debug!("empty arrivals body");
        return Ok(Vec::new());
    };

    let reference_millis = match reference_time(header) {
        Ok(t) => t,
        Err(e) => {
            debug!(error = %e, "arrivals body has no reference time");
            return Ok(Vec::new());
        }
    };

    let arrivals: Vec<ArrivalRecord> = rows
        .enumerate()
        .filter_map(|(index, line)| {
            Row::decode(line)
                .and_then(|row| columns.decode(&row, reference_millis))
                .inspect_err(|e| debug!(row = index + 1, error = %e, "skipping arrival row"))
                .ok()
        })
        .collect();

    debug!(count = arrivals.len(), reference_millis, "parsed arrivals");
    Ok(arrivals)
}
