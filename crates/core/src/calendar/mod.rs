//! Date dimension attribute derivation.
//!
//! Every attribute of a calendar day is a pure function of the date, so the
//! date dimension can be regenerated for any range without consulting
//! existing rows beyond a key-existence check.

use atelier_shared::DateKey;
use chrono::{Datelike, NaiveDate, Weekday};

/// A fully derived date dimension row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    /// Deterministic surrogate key (`YYYYMMDD`).
    pub date_key: DateKey,
    /// The calendar date itself.
    pub date: NaiveDate,
    /// Calendar year.
    pub year: i32,
    /// Quarter, 1-4.
    pub quarter: i32,
    /// Month, 1-12.
    pub month: i32,
    /// English month name.
    pub month_name: &'static str,
    /// Day of month, 1-31.
    pub day: i32,
    /// ISO day of week, Monday = 1 .. Sunday = 7.
    pub day_of_week: i32,
    /// English day name.
    pub day_name: &'static str,
    /// Saturday or Sunday.
    pub is_weekend: bool,
    /// Holiday flag. Always false: holiday calendars are an acknowledged
    /// placeholder, not yet a requirement.
    pub is_holiday: bool,
}

impl CalendarDay {
    /// Derives all date dimension attributes for one calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        let month = i32::try_from(date.month()).unwrap_or(0);
        let weekday = date.weekday();

        Self {
            date_key: DateKey::from_date(date),
            date,
            year: date.year(),
            quarter: (month - 1) / 3 + 1,
            month,
            month_name: month_name(date.month()),
            day: i32::try_from(date.day()).unwrap_or(0),
            day_of_week: i32::try_from(weekday.number_from_monday()).unwrap_or(0),
            day_name: day_name(weekday),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            is_holiday: false,
        }
    }
}

/// Yields every calendar day from `start` to `end` inclusive.
///
/// An inverted range (`end < start`) yields nothing; the caller treats it as
/// a no-op rather than an error.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2026, 1, 15), 1)]
    #[case(date(2026, 3, 31), 1)]
    #[case(date(2026, 4, 1), 2)]
    #[case(date(2026, 6, 30), 2)]
    #[case(date(2026, 7, 1), 3)]
    #[case(date(2026, 10, 1), 4)]
    #[case(date(2026, 12, 31), 4)]
    fn test_quarter_boundaries(#[case] d: NaiveDate, #[case] expected: i32) {
        assert_eq!(CalendarDay::from_date(d).quarter, expected);
    }

    #[rstest]
    // 2026-08-29 is a Saturday, 2026-08-31 a Monday
    #[case(date(2026, 8, 29), 6, "Saturday", true)]
    #[case(date(2026, 8, 30), 7, "Sunday", true)]
    #[case(date(2026, 8, 31), 1, "Monday", false)]
    #[case(date(2026, 9, 4), 5, "Friday", false)]
    fn test_weekday_attributes(
        #[case] d: NaiveDate,
        #[case] dow: i32,
        #[case] name: &str,
        #[case] weekend: bool,
    ) {
        let day = CalendarDay::from_date(d);
        assert_eq!(day.day_of_week, dow);
        assert_eq!(day.day_name, name);
        assert_eq!(day.is_weekend, weekend);
    }

    #[test]
    fn test_full_derivation() {
        let day = CalendarDay::from_date(date(2026, 2, 14));
        assert_eq!(day.date_key.value(), 20_260_214);
        assert_eq!(day.year, 2026);
        assert_eq!(day.quarter, 1);
        assert_eq!(day.month, 2);
        assert_eq!(day.month_name, "February");
        assert_eq!(day.day, 14);
        assert!(!day.is_holiday);
    }

    #[test]
    fn test_holiday_flag_is_placeholder() {
        // Christmas is still a working day as far as the warehouse knows
        assert!(!CalendarDay::from_date(date(2026, 12, 25)).is_holiday);
    }

    #[test]
    fn test_date_range_inclusive() {
        let days: Vec<_> = date_range(date(2026, 2, 27), date(2026, 3, 2)).collect();
        assert_eq!(
            days,
            vec![
                date(2026, 2, 27),
                date(2026, 2, 28),
                date(2026, 3, 1),
                date(2026, 3, 2),
            ]
        );
    }

    #[test]
    fn test_date_range_single_day() {
        let days: Vec<_> = date_range(date(2026, 1, 1), date(2026, 1, 1)).collect();
        assert_eq!(days.len(), 1);
    }

    #[test]
    fn test_date_range_inverted_is_empty() {
        let days: Vec<_> = date_range(date(2026, 1, 2), date(2026, 1, 1)).collect();
        assert!(days.is_empty());
    }

    proptest! {
        /// Date keys are unique and strictly increasing within any range,
        /// so overlapping range generation can never collide.
        #[test]
        fn prop_date_keys_strictly_increase(offset in 0i64..20_000, len in 0i64..400) {
            let start = date(2000, 1, 1) + chrono::Duration::days(offset);
            let end = start + chrono::Duration::days(len);

            let keys: Vec<i32> = date_range(start, end)
                .map(|d| CalendarDay::from_date(d).date_key.value())
                .collect();

            prop_assert_eq!(keys.len() as i64, len + 1);
            for pair in keys.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }

        /// Every derived day round-trips through its key.
        #[test]
        fn prop_key_round_trips(offset in 0i64..40_000) {
            let d = date(1990, 1, 1) + chrono::Duration::days(offset);
            let day = CalendarDay::from_date(d);
            prop_assert_eq!(day.date_key.to_date(), Some(d));
        }
    }
}
