//! Serialization of ranked results into the host's text fields.
//!
//! The host splits both fields on `;` and reads fixed-size groups. Values are
//! not escaped: names have already had the delimiter replaced at parse time.

use crate::rank::{NearbyStop, RankedArrivals};

/// Separator between fields and between records.
pub const FIELD_SEPARATOR: &str = ";";

/// `name;distance;id` for each nearby stop, all joined by `;`.
///
/// # Examples
///
/// ```
/// use acbus::domain::StopId;
/// use acbus::host::format_bus_stop_data;
/// use acbus::rank::NearbyStop;
///
/// let stops = vec![
///     NearbyStop { name: "Aachen Bushof".into(), distance_meters: 273, id: StopId::new("100000") },
///     NearbyStop { name: "Kaiserplatz".into(), distance_meters: 420, id: StopId::new("100303") },
/// ];
/// assert_eq!(
///     format_bus_stop_data(&stops),
///     "Aachen Bushof;273;100000;Kaiserplatz;420;100303"
/// );
/// ```
pub fn format_bus_stop_data(stops: &[NearbyStop]) -> String {
    stops
        .iter()
        .flat_map(|stop| {
            [
                stop.name.clone(),
                stop.distance_meters.to_string(),
                stop.id.to_string(),
            ]
        })
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
}

/// Arrival count, then `line;destination;eta` per arrival, all joined by `;`.
pub fn format_bus_data(arrivals: &RankedArrivals) -> String {
    std::iter::once(arrivals.count().to_string())
        .chain(arrivals.entries.iter().flat_map(|a| {
            [
                a.line_number.clone(),
                a.destination.clone(),
                a.eta_minutes.to_string(),
            ]
        }))
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
}
