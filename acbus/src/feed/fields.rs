//! URA return-list fields and their column positions.
//!
//! The instant interface answers with the requested fields in its own
//! canonical order, whatever order the `ReturnList` parameter used. Column 0
//! of every row is the response type, so the first returned field sits in
//! column 1.

use std::fmt;

/// A field that can be requested through `ReturnList`.
///
/// Variants are declared in the interface's canonical output order; the
/// derived `Ord` is what [`FieldLayout`] sorts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    StopPointName,
    StopId,
    StopCode1,
    StopCode2,
    StopPointType,
    Towards,
    Bearing,
    StopPointIndicator,
    StopPointState,
    Latitude,
    Longitude,
    VisitNumber,
    TripId,
    VehicleId,
    RegistrationNumber,
    LineId,
    LineName,
    DirectionId,
    DestinationText,
    DestinationName,
    EstimatedTime,
    ExpireTime,
}

impl Field {
    /// Parameter name as the interface spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::StopPointName => "StopPointName",
            Field::StopId => "StopID",
            Field::StopCode1 => "StopCode1",
            Field::StopCode2 => "StopCode2",
            Field::StopPointType => "StopPointType",
            Field::Towards => "Towards",
            Field::Bearing => "Bearing",
            Field::StopPointIndicator => "StopPointIndicator",
            Field::StopPointState => "StopPointState",
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
            Field::VisitNumber => "VisitNumber",
            Field::TripId => "TripID",
            Field::VehicleId => "VehicleID",
            Field::RegistrationNumber => "RegistrationNumber",
            Field::LineId => "LineID",
            Field::LineName => "LineName",
            Field::DirectionId => "DirectionID",
            Field::DestinationText => "DestinationText",
            Field::DestinationName => "DestinationName",
            Field::EstimatedTime => "EstimatedTime",
            Field::ExpireTime => "ExpireTime",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields requested for the stop list.
pub const STOP_FIELDS: [Field; 4] = [
    Field::StopPointName,
    Field::StopId,
    Field::Longitude,
    Field::Latitude,
];

/// Fields requested for the arrivals at one stop.
pub const ARRIVAL_FIELDS: [Field; 4] = [
    Field::StopPointName,
    Field::LineName,
    Field::DestinationName,
    Field::EstimatedTime,
];

/// Render a field list as the value of the `ReturnList` parameter.
pub fn return_list(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Column positions for one requested field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// Requested fields in canonical order, without duplicates.
    columns: Vec<Field>,
}

impl FieldLayout {
    /// Bind column indices to exactly the fields that were requested.
    ///
    /// # Examples
    ///
    /// ```
    /// use acbus::feed::{Field, FieldLayout};
    ///
    /// // Longitude is requested before Latitude but returned after it.
    /// let layout = FieldLayout::new(&[Field::StopId, Field::Longitude, Field::Latitude]);
    /// assert_eq!(layout.column(Field::StopId), Some(1));
    /// assert_eq!(layout.column(Field::Latitude), Some(2));
    /// assert_eq!(layout.column(Field::Longitude), Some(3));
    /// ```
    pub fn new(requested: &[Field]) -> Self {
        let mut columns = requested.to_vec();
        columns.sort();
        columns.dedup();
        Self { columns }
    }

    /// Column index of `field`, or `None` if it was not requested.
    pub fn column(&self, field: Field) -> Option<usize> {
        self.columns
            .binary_search(&field)
            .ok()
            .map(|position| position + 1)
    }

    /// Number of columns a complete row carries, including the type column.
    pub fn width(&self) -> usize {
        self.columns.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_layout_puts_latitude_before_longitude() {
        let layout = FieldLayout::new(&STOP_FIELDS);
        assert_eq!(layout.column(Field::StopPointName), Some(1));
        assert_eq!(layout.column(Field::StopId), Some(2));
        assert_eq!(layout.column(Field::Latitude), Some(3));
        assert_eq!(layout.column(Field::Longitude), Some(4));
        assert_eq!(layout.width(), 5);
    }

    #[test]
    fn arrival_layout() {
        let layout = FieldLayout::new(&ARRIVAL_FIELDS);
        assert_eq!(layout.column(Field::StopPointName), Some(1));
        assert_eq!(layout.column(Field::LineName), Some(2));
        assert_eq!(layout.column(Field::DestinationName), Some(3));
        assert_eq!(layout.column(Field::EstimatedTime), Some(4));
    }

    #[test]
    fn request_order_does_not_matter() {
        let a = FieldLayout::new(&[Field::Latitude, Field::StopId, Field::Longitude]);
        let b = FieldLayout::new(&[Field::Longitude, Field::Latitude, Field::StopId]);
        assert_eq!(a, b);
    }

    #[test]
    fn unrequested_field_has_no_column() {
        let layout = FieldLayout::new(&STOP_FIELDS);
        assert_eq!(layout.column(Field::EstimatedTime), None);
    }

    #[test]
    fn duplicates_are_collapsed() {
        let layout = FieldLayout::new(&[Field::StopId, Field::StopId, Field::Latitude]);
        assert_eq!(layout.width(), 3);
        assert_eq!(layout.column(Field::Latitude), Some(2));
    }

    #[test]
    fn return_list_keeps_request_order() {
        assert_eq!(
            return_list(&STOP_FIELDS),
            "StopPointName,StopID,Longitude,Latitude"
        );
        assert_eq!(
            return_list(&ARRIVAL_FIELDS),
            "StopPointName,LineName,DestinationName,EstimatedTime"
        );
    }
}
