//! Bus arrival records.

const MILLIS_PER_MINUTE: i64 = 60_000;

/// One upcoming bus at the selected stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalRecord {
    pub line_number: String,
    /// Display name of the destination, already transliterated.
    pub destination: String,
    /// Arrival time minus the feed's reference time. Never negative.
    pub eta_offset_millis: i64,
}

impl ArrivalRecord {
    /// Build a record from the raw arrival timestamp and the feed's reference
    /// time (both epoch milliseconds).
    ///
    /// Arrivals that the feed already reports in the past (clock skew between
    /// the vehicle and the server) are clamped to "now".
    pub fn new(
        line_number: impl Into<String>,
        destination: impl Into<String>,
        arrival_millis: i64,
        reference_millis: i64,
    ) -> Self {
        let offset = arrival_millis.saturating_sub(reference_millis).max(0);
        Self {
            line_number: line_number.into(),
            destination: destination.into(),
            eta_offset_millis: offset,
        }
    }

    /// ETA rounded to the nearest whole minute (halves round up).
    ///
    /// # Examples
    ///
    /// ```
    /// use acbus::domain::ArrivalRecord;
    ///
    /// assert_eq!(ArrivalRecord::new("33", "Vaals", 1_089_999, 1_000_000).eta_minutes(), 1);
    /// assert_eq!(ArrivalRecord::new("33", "Vaals", 1_029_999, 1_000_000).eta_minutes(), 0);
    /// ```
    pub fn eta_minutes(&self) -> i64 {
        self.eta_offset_millis.saturating_add(MILLIS_PER_MINUTE / 2) / MILLIS_PER_MINUTE
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn never_negative(arrival in any::<i64>(), reference in any::<i64>()) {
            let a = ArrivalRecord::new("1", "x", arrival, reference);
            prop_assert!(a.eta_offset_millis >= 0);
            prop_assert!(a.eta_minutes() >= 0);
        }
    }
}
