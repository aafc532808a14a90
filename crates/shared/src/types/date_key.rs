//! Date key type for the warehouse date dimension.
//!
//! A date key encodes a calendar date as a `YYYYMMDD` integer. It is
//! deterministic (never auto-incremented), so the same date always maps to
//! the same surrogate key and re-generation is naturally idempotent.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Surrogate key for the date dimension: a date encoded as `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(i32);

impl DateKey {
    /// Wraps a raw `YYYYMMDD` integer read back from the warehouse.
    #[must_use]
    pub const fn from_raw(value: i32) -> Self {
        Self(value)
    }

    /// Encodes a calendar date as a `YYYYMMDD` key.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        // month * 100 + day is at most 1231, always within i32
        let month_day = i32::try_from(date.month() * 100 + date.day()).unwrap_or(0);
        Self(date.year() * 10_000 + month_day)
    }

    /// Decodes the key back into a calendar date.
    ///
    /// Returns `None` if the stored integer does not encode a valid date.
    #[must_use]
    pub fn to_date(self) -> Option<NaiveDate> {
        let year = self.0 / 10_000;
        let month = u32::try_from((self.0 / 100) % 100).ok()?;
        let day = u32::try_from(self.0 % 100).ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Returns the raw `YYYYMMDD` integer.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl From<DateKey> for i32 {
    fn from(key: DateKey) -> Self {
        key.0
    }
}

impl std::fmt::Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2026, 1, 5, 20_260_105)]
    #[case(2026, 12, 31, 20_261_231)]
    #[case(2024, 2, 29, 20_240_229)]
    #[case(1999, 10, 1, 19_991_001)]
    fn test_encode(#[case] y: i32, #[case] m: u32, #[case] d: u32, #[case] expected: i32) {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(DateKey::from_date(date).value(), expected);
    }

    #[test]
    fn test_round_trip() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let key = DateKey::from_date(date);
        assert_eq!(key.to_date(), Some(date));
    }

    #[test]
    fn test_invalid_key_decodes_to_none() {
        // February 30th does not exist
        let key: DateKey = serde_json::from_str("20260230").unwrap();
        assert_eq!(key.to_date(), None);
    }

    #[test]
    fn test_ordering_matches_date_ordering() {
        let a = DateKey::from_date(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        let b = DateKey::from_date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert!(a < b);
    }
}
