//! Calendar engine and selection state machine for embeddable date pickers.
//!
//! The crate computes month grids, evaluates a disabled-date policy, tracks
//! single and range selection across a days/months/years view, and maps
//! keyboard input to navigation. Painting the result is left to the host.

mod calendar;
mod config;
mod consts;
mod events;
mod formatter;
mod keyboard;
mod notify;
mod policy;
mod prelude;
mod range;
mod state;
mod types;

pub use calendar::{
    CalendarCell, CalendarOptions, CellContext, MonthCell, YearCell, first_of_week, is_disabled,
    last_of_week, month_cells, month_grid, month_overview, weekday_labels, year_page,
    year_page_start,
};
pub use config::{ConfigError, DisabledDate, PickerConfig};
pub use consts::*;
pub use events::EventStore;
pub use formatter::{EnglishFormatter, LocaleFormatter, NameLength};
pub use keyboard::{
    FocusStep, FocusTrap, Key, KeyAction, KeyOutcome, Modifiers, TabDirection, find_enabled_toward,
    find_nearest_enabled, map_key,
};
pub use notify::{ListenerId, NotificationSink, PickerEvent, StateView};
pub use policy::DisabledPolicy;
pub use range::{DateRange, RangeError, date_range};
pub use state::{DatePicker, SelectionMode, SelectionState, ViewMode, ViewState, ViewTransition};
pub use types::{Weekday, days_in_month, is_leap_year};

use crate::prelude::*;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use types::{civil_from_days, days_from_civil, weekday_from_days};

/// A calendar day: year, 0-based month, and day of month.
///
/// Ordering and equality are by calendar day. Arithmetic normalizes overflow,
/// and month/year steps clamp the day to the end of the target month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    year: i32,
    month: u8,
    day: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Invalid year: {} (must be {}-{})", "_0", MIN_YEAR, MAX_YEAR)]
    InvalidYear(i32),
    #[display(fmt = "Invalid month index: {} (must be 0-{})", "_0", MAX_MONTH_INDEX)]
    InvalidMonth(u8),
    #[display(fmt = "Invalid day {day} for month {year}-{:02}", "month + 1")]
    InvalidDay { year: i32, month: u8, day: u8 },
    #[display(fmt = "Invalid weekday index: {} (must be 0-{})", "_0", MAX_WEEKDAY_INDEX)]
    InvalidWeekday(u8),
    #[display(fmt = "Empty date string")]
    EmptyInput,
}

impl std::error::Error for ParseError {}

impl CalendarDate {
    /// Creates a date from a year, a 0-based month and a day of month
    ///
    /// # Errors
    /// Returns `ParseError::InvalidYear` for a year outside 1..=9999,
    /// `ParseError::InvalidMonth` for a month index above 11 and
    /// `ParseError::InvalidDay` for a day that does not exist in that month.
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, ParseError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ParseError::InvalidYear(year));
        }
        if !types::is_month_index(month) {
            return Err(ParseError::InvalidMonth(month));
        }
        if day < MIN_DAY || day > days_in_month(year, month) {
            return Err(ParseError::InvalidDay { year, month, day });
        }
        Ok(Self { year, month, day })
    }

    /// Creates the first day of a month, clamping the month index into 0..=11
    pub fn first_of_month(year: i32, month: u8) -> Self {
        Self {
            year,
            month: month.min(DECEMBER),
            day: MIN_DAY,
        }
    }

    /// Today's date in UTC
    pub fn today() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let days = i64::try_from(duration.as_secs() / 86_400).unwrap_or_default();
        Self::from_days(days)
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    /// 0-based month (January is 0)
    pub const fn month(&self) -> u8 {
        self.month
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    pub fn weekday(&self) -> Weekday {
        weekday_from_days(self.to_days())
    }

    /// Returns the date `n` days later (earlier for negative `n`)
    pub fn add_days(&self, n: i64) -> Self {
        Self::from_days(self.to_days() + n)
    }

    /// Returns the date `n` months later, clamping the day to the target month's length.
    ///
    /// The resulting month is clamped into January of `MIN_YEAR` through
    /// December of `MAX_YEAR`.
    pub fn add_months(&self, n: i32) -> Self {
        self.shift_months(i64::from(n))
    }

    /// Returns the date `n` years later; Feb 29 clamps to Feb 28 in non-leap years
    pub fn add_years(&self, n: i32) -> Self {
        self.shift_months(i64::from(n) * i64::from(MONTHS_PER_YEAR))
    }

    /// Returns the same day in another month of the same year, clamped
    pub fn with_month(&self, month: u8) -> Self {
        let month = month.min(DECEMBER);
        self.add_months(i32::from(month) - i32::from(self.month))
    }

    /// Returns the same month and day in another year, clamped
    pub fn with_year(&self, year: i32) -> Self {
        let years = i64::from(year) - i64::from(self.year);
        self.shift_months(years * i64::from(MONTHS_PER_YEAR))
    }

    fn shift_months(&self, n: i64) -> Self {
        let per_year = i64::from(MONTHS_PER_YEAR);
        let lowest = i64::from(MIN_YEAR) * per_year;
        let highest = i64::from(MAX_YEAR) * per_year + i64::from(DECEMBER);
        let total = (i64::from(self.year) * per_year + i64::from(self.month))
            .saturating_add(n)
            .clamp(lowest, highest);
        // the clamp keeps the year within MIN_YEAR..=MAX_YEAR
        let year = i32::try_from(total.div_euclid(per_year)).unwrap_or(MAX_YEAR);
        let month = u8::try_from(total.rem_euclid(per_year)).unwrap_or(JANUARY);
        let day = self.day.min(days_in_month(year, month));
        Self { year, month, day }
    }

    /// Signed number of days from `self` to `other`
    pub fn days_until(&self, other: &Self) -> i64 {
        other.to_days() - self.to_days()
    }

    /// Whether both dates fall in the same month of the same year
    pub fn same_month(&self, other: &Self) -> bool {
        self.year == other.year && self.month == other.month
    }

    /// Key used to index per-day data: `yyyy-MM-dd`
    pub fn iso_key(&self) -> String {
        self.to_string()
    }

    pub(crate) const fn to_days(self) -> i64 {
        days_from_civil(self.year, self.month, self.day)
    }

    pub(crate) const fn from_days(days: i64) -> Self {
        let (year, month, day) = civil_from_days(days);
        Self { year, month, day }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{DATE_SEPARATOR}{:02}{DATE_SEPARATOR}{:02}",
            self.year,
            self.month + 1,
            self.day
        )
    }
}

impl FromStr for CalendarDate {
    type Err = ParseError;

    /// Parses ISO `yyyy-MM-dd` or month-first `MM/dd/yyyy` text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let has_hyphen = trimmed.contains(DATE_SEPARATOR);
        let has_slash = trimmed.contains(MONTH_FIRST_SEPARATOR);
        if has_hyphen && has_slash {
            return Err(ParseError::InvalidFormat(format!(
                "Mixed delimiters ({DATE_SEPARATOR} and {MONTH_FIRST_SEPARATOR})"
            )));
        }

        let (separator, order) = if has_hyphen {
            (DATE_SEPARATOR, FieldOrder::YearFirst)
        } else if has_slash {
            (MONTH_FIRST_SEPARATOR, FieldOrder::MonthFirst)
        } else {
            return Err(ParseError::InvalidFormat(trimmed.to_owned()));
        };

        let parts: Vec<&str> = trimmed.split(separator).map(str::trim).collect();
        let [a, b, c] = parts.as_slice() else {
            return Err(ParseError::InvalidFormat(format!(
                "Expected 2 {separator} separators, found {}",
                parts.len() - 1
            )));
        };

        let (year, month, day) = match order {
            FieldOrder::YearFirst => (Self::parse_year(a)?, Self::parse_u8(b)?, Self::parse_u8(c)?),
            FieldOrder::MonthFirst => (Self::parse_year(c)?, Self::parse_u8(a)?, Self::parse_u8(b)?),
        };
        if month == 0 {
            return Err(ParseError::InvalidMonth(month));
        }
        Self::new(year, month - 1, day)
    }
}

enum FieldOrder {
    YearFirst,
    MonthFirst,
}

impl CalendarDate {
    fn parse_year(s: &str) -> Result<i32, ParseError> {
        let year = s
            .parse::<i32>()
            .map_err(|_| ParseError::InvalidFormat(s.to_owned()))?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ParseError::InvalidYear(year));
        }
        Ok(year)
    }

    fn parse_u8(s: &str) -> Result<u8, ParseError> {
        s.parse::<u8>()
            .map_err(|_| ParseError::InvalidFormat(s.to_owned()))
    }
}

impl serde::Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ymd;

    #[test]
    fn test_new_validates_month_and_day() {
        assert!(CalendarDate::new(2025, 0, 31).is_ok());
        assert!(matches!(
            CalendarDate::new(2025, 12, 1),
            Err(ParseError::InvalidMonth(12))
        ));
        assert!(matches!(
            CalendarDate::new(2025, 1, 29),
            Err(ParseError::InvalidDay { .. })
        ));
        assert!(CalendarDate::new(2024, 1, 29).is_ok());
        assert!(matches!(
            CalendarDate::new(2025, 3, 0),
            Err(ParseError::InvalidDay { .. })
        ));
    }

    #[test]
    fn test_display_iso_key() {
        assert_eq!(ymd(2025, 4, 5).to_string(), "2025-04-05");
        assert_eq!(ymd(2025, 12, 31).iso_key(), "2025-12-31");
    }

    #[test]
    fn test_parse_iso() {
        let date = "2025-04-15".parse::<CalendarDate>().unwrap();
        assert_eq!(date, ymd(2025, 4, 15));
        assert_eq!(date.month(), 3);
    }

    #[test]
    fn test_parse_month_first() {
        let date = " 04/15/2025 ".parse::<CalendarDate>().unwrap();
        assert_eq!(date, ymd(2025, 4, 15));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<CalendarDate>(), Err(ParseError::EmptyInput));
        assert!(matches!(
            "2025".parse::<CalendarDate>(),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            "2025-04/15".parse::<CalendarDate>(),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            "2025-13-01".parse::<CalendarDate>(),
            Err(ParseError::InvalidMonth(12))
        ));
        assert!(matches!(
            "2025-00-01".parse::<CalendarDate>(),
            Err(ParseError::InvalidMonth(0))
        ));
        assert!(matches!(
            "2025-02-29".parse::<CalendarDate>(),
            Err(ParseError::InvalidDay { .. })
        ));
        assert!(matches!(
            "10000-01-01".parse::<CalendarDate>(),
            Err(ParseError::InvalidYear(10000))
        ));
        assert!(matches!(
            "2025-04-XX".parse::<CalendarDate>(),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            "2025-04-15-01".parse::<CalendarDate>(),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_error_display() {
        let err = "2025-02-30".parse::<CalendarDate>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid day 30 for month 2025-02");
    }

    #[test]
    fn test_ordering() {
        assert!(ymd(2024, 12, 31) < ymd(2025, 1, 1));
        assert!(ymd(2025, 4, 14) < ymd(2025, 4, 15));
        assert!(ymd(2025, 3, 31) < ymd(2025, 4, 1));
    }

    #[test]
    fn test_add_days_rolls_months_and_years() {
        assert_eq!(ymd(2025, 4, 30).add_days(1), ymd(2025, 5, 1));
        assert_eq!(ymd(2025, 12, 31).add_days(1), ymd(2026, 1, 1));
        assert_eq!(ymd(2025, 1, 1).add_days(-1), ymd(2024, 12, 31));
        assert_eq!(ymd(2024, 2, 28).add_days(1), ymd(2024, 2, 29));
    }

    #[test]
    fn test_add_months_clamps() {
        struct TestCase {
            start: CalendarDate,
            months: i32,
            expected: CalendarDate,
            description: &'static str,
        }

        let cases = [
            TestCase {
                start: ymd(2025, 1, 31),
                months: 1,
                expected: ymd(2025, 2, 28),
                description: "Jan 31 to non-leap February",
            },
            TestCase {
                start: ymd(2024, 1, 31),
                months: 1,
                expected: ymd(2024, 2, 29),
                description: "Jan 31 to leap February",
            },
            TestCase {
                start: ymd(2025, 3, 31),
                months: 1,
                expected: ymd(2025, 4, 30),
                description: "31st into a 30-day month",
            },
            TestCase {
                start: ymd(2025, 12, 15),
                months: 1,
                expected: ymd(2026, 1, 15),
                description: "December rolls the year forward",
            },
            TestCase {
                start: ymd(2025, 1, 15),
                months: -1,
                expected: ymd(2024, 12, 15),
                description: "January rolls the year back",
            },
            TestCase {
                start: ymd(2025, 5, 31),
                months: -3,
                expected: ymd(2025, 2, 28),
                description: "backwards with clamping",
            },
        ];

        for case in &cases {
            assert_eq!(
                case.start.add_months(case.months),
                case.expected,
                "{}",
                case.description
            );
        }
    }

    #[test]
    fn test_add_years_clamps_leap_day() {
        assert_eq!(ymd(2024, 2, 29).add_years(1), ymd(2025, 2, 28));
        assert_eq!(ymd(2024, 2, 29).add_years(4), ymd(2028, 2, 29));
        assert_eq!(ymd(2025, 4, 15).add_years(-10), ymd(2015, 4, 15));
    }

    #[test]
    fn test_with_month_and_year() {
        assert_eq!(ymd(2025, 1, 31).with_month(3), ymd(2025, 4, 30));
        assert_eq!(ymd(2024, 2, 29).with_year(2023), ymd(2023, 2, 28));
    }

    #[test]
    fn test_new_rejects_out_of_range_year() {
        assert_eq!(CalendarDate::new(0, 0, 1), Err(ParseError::InvalidYear(0)));
        assert_eq!(
            CalendarDate::new(10_000, 0, 1),
            Err(ParseError::InvalidYear(10_000))
        );
        assert!(CalendarDate::new(MAX_YEAR, DECEMBER, 31).is_ok());
    }

    #[test]
    fn test_month_steps_saturate_at_supported_years() {
        assert_eq!(ymd(9999, 12, 31).add_months(1), ymd(9999, 12, 31));
        assert_eq!(ymd(1, 1, 1).add_months(-1), ymd(1, 1, 1));
        assert_eq!(ymd(2025, 4, 15).add_years(i32::MAX), ymd(9999, 4, 15));
        assert_eq!(ymd(2025, 4, 15).add_years(i32::MIN), ymd(1, 4, 15));
        assert_eq!(ymd(2025, 4, 15).with_year(i32::MAX / 2), ymd(9999, 4, 15));
        assert_eq!(ymd(2025, 4, 15).with_year(i32::MIN), ymd(1, 4, 15));
    }

    #[test]
    fn test_weekday() {
        assert_eq!(ymd(2025, 4, 15).weekday(), Weekday::Tuesday);
        assert_eq!(ymd(2025, 4, 13).weekday(), Weekday::Sunday);
        assert_eq!(ymd(2000, 1, 1).weekday(), Weekday::Saturday);
    }

    #[test]
    fn test_days_until() {
        assert_eq!(ymd(2025, 4, 15).days_until(&ymd(2025, 4, 20)), 5);
        assert_eq!(ymd(2025, 4, 20).days_until(&ymd(2025, 4, 15)), -5);
        assert_eq!(ymd(2024, 1, 1).days_until(&ymd(2025, 1, 1)), 366);
    }

    #[test]
    fn test_serde_string_format() {
        let date = ymd(2025, 4, 15);
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, r#""2025-04-15""#);
        let parsed: CalendarDate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, date);

        let result: Result<CalendarDate, _> = serde_json::from_str(r#""2025-02-30""#);
        assert!(result.is_err());
    }
}
