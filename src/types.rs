use crate::ParseError;
use crate::consts::{
    CENTURY_CYCLE, DAYS_IN_MONTH, DAYS_PER_WEEK, FEBRUARY, FEBRUARY_DAYS_LEAP, GREGORIAN_CYCLE,
    LEAP_YEAR_CYCLE, MAX_MONTH_INDEX, MAX_WEEKDAY_INDEX,
};
use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// A day of the week, indexed 0 (Sunday) through 6 (Saturday).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Weekday {
    #[default]
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All weekdays in index order, starting on Sunday
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Creates a weekday from its 0-6 index
    ///
    /// # Errors
    /// Returns `ParseError::InvalidWeekday` if the index is greater than 6.
    pub fn new(index: u8) -> Result<Self, ParseError> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or(ParseError::InvalidWeekday(index))
    }

    /// Returns the weekday index (Sunday is 0)
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the weekday `offset` days after this one, wrapping around the week
    pub fn offset(self, offset: i64) -> Self {
        let index = (i64::from(self.index()) + offset).rem_euclid(DAYS_PER_WEEK);
        // rem_euclid keeps the index within 0..7
        Self::ALL[usize::try_from(index).unwrap_or_default()]
    }

    /// Number of days to step back from `self` to reach `first_day_of_week`
    pub fn days_since(self, first_day_of_week: Self) -> i64 {
        (i64::from(self.index()) - i64::from(first_day_of_week.index())).rem_euclid(DAYS_PER_WEEK)
    }
}

impl TryFrom<u8> for Weekday {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Weekday> for u8 {
    fn from(weekday: Weekday) -> Self {
        weekday.index()
    }
}

// Helper functions

pub const fn is_leap_year(year: i32) -> bool {
    (year % LEAP_YEAR_CYCLE == 0 && year % CENTURY_CYCLE != 0) || (year % GREGORIAN_CYCLE == 0)
}

/// Days in the 0-based `month` of `year`
pub const fn days_in_month(year: i32, month: u8) -> u8 {
    debug_assert!(month <= MAX_MONTH_INDEX);

    if month == FEBRUARY && is_leap_year(year) {
        FEBRUARY_DAYS_LEAP
    } else {
        DAYS_IN_MONTH[month as usize]
    }
}

/// Whether a weekday index is within 0..=6
pub const fn is_weekday_index(index: u8) -> bool {
    index <= MAX_WEEKDAY_INDEX
}

/// Whether a month index is within 0..=11
pub const fn is_month_index(index: u8) -> bool {
    index <= MAX_MONTH_INDEX
}

/// Days since 1970-01-01 for a proleptic Gregorian date (0-based month).
pub(crate) const fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let m = month as i64 + 1;
    let y = year as i64 - if m <= 2 { 1 } else { 0 };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = m + if m > 2 { -3 } else { 9 };
    let doy = (153 * mp + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`]: `(year, 0-based month, day)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) const fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = mp + if mp < 10 { 3 } else { -9 };
    let year = y + if month <= 2 { 1 } else { 0 };
    (year as i32, (month - 1) as u8, day as u8)
}

/// Weekday of a day count produced by [`days_from_civil`] (1970-01-01 was a Thursday)
pub(crate) fn weekday_from_days(days: i64) -> Weekday {
    Weekday::Thursday.offset(days)
}
