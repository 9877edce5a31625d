use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CalendarDate, ParseError, RANGE_SEPARATOR, prelude::*};

/// An inclusive span of calendar days.
/// The start date is always less than or equal to the end date; reversed
/// endpoints are swapped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{start}/{end}")]
pub struct DateRange {
    start: CalendarDate,
    end:   CalendarDate,
}

/// Error type for parsing date ranges.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// An endpoint is not a valid date.
    #[error(transparent)]
    ParseError(#[from] ParseError),

    /// Invalid range format.
    #[error("Invalid range format: {0}")]
    InvalidFormat(String),
}

impl DateRange {
    /// Creates a range from two endpoints in either order.
    pub fn new(a: CalendarDate, b: CalendarDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A range covering a single day
    pub const fn single(date: CalendarDate) -> Self {
        Self {
            start: date,
            end:   date,
        }
    }

    /// First day of the range
    pub const fn start(&self) -> CalendarDate {
        self.start
    }

    /// Last day of the range, inclusive
    pub const fn end(&self) -> CalendarDate {
        self.end
    }

    /// `(start, end)`
    pub const fn dates(&self) -> (CalendarDate, CalendarDate) {
        (self.start, self.end)
    }

    /// Whether `date` falls within the range, endpoints included
    pub fn contains(&self, date: &CalendarDate) -> bool {
        self.start <= *date && *date <= self.end
    }

    /// Whether the two ranges share at least one day
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Number of days in the range, counting both endpoints
    pub fn len_days(&self) -> i64 {
        self.start.days_until(&self.end) + 1
    }

    /// Iterates the days of the range in ascending order
    pub fn iter(&self) -> impl Iterator<Item = CalendarDate> + use<> {
        let start = self.start;
        (0..self.len_days()).map(move |offset| start.add_days(offset))
    }
}

/// Every day from `a` to `b` inclusive, ascending; operands may come in either order.
pub fn date_range(a: CalendarDate, b: CalendarDate) -> Vec<CalendarDate> {
    DateRange::new(a, b).iter().collect()
}

impl FromStr for DateRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        let separator_count = trimmed.matches(RANGE_SEPARATOR).count();

        match separator_count {
            0 => Err(RangeError::InvalidFormat(format!(
                "No range separator found (expected '{RANGE_SEPARATOR}'): {s}"
            ))),
            1 => {
                let (start_str, end_str) = trimmed.split_once(RANGE_SEPARATOR).ok_or_else(|| {
                    RangeError::InvalidFormat(format!(
                        "Separator '{RANGE_SEPARATOR}' not found despite count == 1"
                    ))
                })?;

                // Endpoints are ISO dates; the month-first form would collide with the separator
                let start = start_str.trim().parse::<CalendarDate>()?;
                let end = end_str.trim().parse::<CalendarDate>()?;

                Ok(Self::new(start, end))
            },
            _ => Err(RangeError::InvalidFormat(format!(
                "Too many '{RANGE_SEPARATOR}' separators: expected 1, found {separator_count}"
            ))),
        }
    }
}

impl Serialize for DateRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DateRange {
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
    fn test_new_range_cases() {
        struct TestCase {
            a:           CalendarDate,
            b:           CalendarDate,
            start:       CalendarDate,
            end:         CalendarDate,
            description: &'static str,
        }

        let cases = [
            TestCase {
                a:           ymd(2025, 4, 15),
                b:           ymd(2025, 4, 20),
                start:       ymd(2025, 4, 15),
                end:         ymd(2025, 4, 20),
                description: "ascending endpoints",
            },
            TestCase {
                a:           ymd(2025, 4, 20),
                b:           ymd(2025, 4, 15),
                start:       ymd(2025, 4, 15),
                end:         ymd(2025, 4, 20),
                description: "reversed endpoints are swapped",
            },
            TestCase {
                a:           ymd(2025, 4, 15),
                b:           ymd(2025, 4, 15),
                start:       ymd(2025, 4, 15),
                end:         ymd(2025, 4, 15),
                description: "equal endpoints",
            },
        ];

        for case in &cases {
            let range = DateRange::new(case.a, case.b);
            assert_eq!(range.dates(), (case.start, case.end), "{}", case.description);
        }
    }

    #[test]
    fn test_date_range_reversed_operands() {
        let days = date_range(ymd(2025, 4, 20), ymd(2025, 4, 15));
        assert_eq!(days.len(), 6);
        assert_eq!(days.first(), Some(&ymd(2025, 4, 15)));
        assert_eq!(days.last(), Some(&ymd(2025, 4, 20)));
        assert!(days.windows(2).all(|w| w[0].add_days(1) == w[1]));
        assert_eq!(days, date_range(ymd(2025, 4, 15), ymd(2025, 4, 20)));
    }

    #[test]
    fn test_date_range_single_day() {
        let days = date_range(ymd(2025, 4, 15), ymd(2025, 4, 15));
        assert_eq!(days, vec![ymd(2025, 4, 15)]);
    }

    #[test]
    fn test_date_range_across_year_end() {
        let days = date_range(ymd(2024, 12, 30), ymd(2025, 1, 2));
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], ymd(2025, 1, 1));
    }

    #[test]
    fn test_contains_and_overlaps() {
        let range = DateRange::new(ymd(2025, 4, 15), ymd(2025, 4, 20));
        assert!(range.contains(&ymd(2025, 4, 15)));
        assert!(range.contains(&ymd(2025, 4, 20)));
        assert!(!range.contains(&ymd(2025, 4, 21)));

        let other = DateRange::new(ymd(2025, 4, 20), ymd(2025, 4, 25));
        assert!(range.overlaps(&other));
        let disjoint = DateRange::single(ymd(2025, 4, 21));
        assert!(!range.overlaps(&disjoint));
    }

    #[test]
    fn test_parse_and_display() {
        let range: DateRange = "2025-04-20/2025-04-15".parse().unwrap();
        assert_eq!(range.start(), ymd(2025, 4, 15));
        assert_eq!(range.to_string(), "2025-04-15/2025-04-20");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "2025-04-15".parse::<DateRange>(),
            Err(RangeError::InvalidFormat(_))
        ));
        assert!(matches!(
            "2025-04-15/2025-04-16/2025-04-17".parse::<DateRange>(),
            Err(RangeError::InvalidFormat(_))
        ));
        assert!(matches!(
            "2025-04-15/2025-02-30".parse::<DateRange>(),
            Err(RangeError::ParseError(ParseError::InvalidDay { .. }))
        ));
    }

    #[test]
    fn test_serde_string_format() {
        let range = DateRange::new(ymd(2025, 4, 15), ymd(2025, 4, 20));
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, r#""2025-04-15/2025-04-20""#);
        let parsed: DateRange = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, range);
    }
}
