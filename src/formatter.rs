//! Locale formatter collaborator.
//!
//! The engine never formats text itself beyond ISO date keys. Hosts inject a
//! [`LocaleFormatter`]; [`EnglishFormatter`] is a reference implementation
//! that ignores the locale token and keeps its own parse cache.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::consts::PARSE_CACHE_CAPACITY;
use crate::prelude::*;
use crate::{CalendarDate, ParseError, Weekday};

/// How much of a month or weekday name to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum NameLength {
    /// A single letter (`"M"`)
    Narrow,
    /// An abbreviation (`"Mon"`)
    #[default]
    Short,
    /// The full name (`"Monday"`)
    Long,
}

/// Text formatting and parsing for a locale.
pub trait LocaleFormatter {
    /// Renders `date` with a pattern built from `yyyy`, `yy`, `MMMM`, `MMM`,
    /// `MM`, `M`, `dd`, `d`, `EEEE` and `EEE`; other characters pass through.
    fn format(&self, date: &CalendarDate, pattern: &str, locale: &str) -> String;

    /// Parses user or attribute text. `hint` is a pattern describing the
    /// expected field order.
    ///
    /// # Errors
    /// Returns a `ParseError` when the text is not a recognizable date.
    fn parse(&self, text: &str, hint: Option<&str>) -> Result<CalendarDate, ParseError>;

    /// Name of the 0-based month `index`
    fn month_name(&self, index: u8, length: NameLength, locale: &str) -> String;

    fn weekday_name(&self, weekday: Weekday, length: NameLength, locale: &str) -> String;
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// English month and weekday names with numeric parsing.
///
/// Successful parses are cached per instance. The cache holds at most
/// `PARSE_CACHE_CAPACITY` entries and is flushed wholesale when full;
/// `clear_cache` empties it on demand.
#[derive(Debug, Default)]
pub struct EnglishFormatter {
    parse_cache: RefCell<HashMap<String, CalendarDate>>,
}

impl EnglishFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached successful parses
    pub fn cached_parses(&self) -> usize {
        self.parse_cache.borrow().len()
    }

    pub fn clear_cache(&self) {
        self.parse_cache.borrow_mut().clear();
    }

    fn shorten(name: &str, length: NameLength) -> String {
        match length {
            NameLength::Narrow => name.chars().take(1).collect(),
            NameLength::Short => name.chars().take(3).collect(),
            NameLength::Long => name.to_owned(),
        }
    }

    /// Parses numeric fields in the order the hint pattern lists them
    fn parse_with_hint(text: &str, hint: &str) -> Result<CalendarDate, ParseError> {
        let order: Vec<char> = pattern_runs(hint)
            .into_iter()
            .filter_map(|(symbol, _)| matches!(symbol, 'y' | 'M' | 'd').then_some(symbol))
            .collect();
        let fields: Vec<&str> = text
            .split(|c: char| !c.is_ascii_digit())
            .filter(|field| !field.is_empty())
            .collect();
        if order.len() != 3 || fields.len() != 3 {
            return Err(ParseError::InvalidFormat(format!(
                "'{text}' does not match pattern '{hint}'"
            )));
        }

        let mut year = None;
        let mut month = None;
        let mut day = None;
        for (symbol, field) in order.iter().zip(&fields) {
            let value = field
                .parse::<i32>()
                .map_err(|_| ParseError::InvalidFormat((*field).to_owned()))?;
            match symbol {
                'y' => year = Some(value),
                'M' => month = Some(value),
                _ => day = Some(value),
            }
        }

        let (Some(year), Some(month), Some(day)) = (year, month, day) else {
            return Err(ParseError::InvalidFormat(format!(
                "pattern '{hint}' repeats a field"
            )));
        };
        if !(crate::MIN_YEAR..=crate::MAX_YEAR).contains(&year) {
            return Err(ParseError::InvalidYear(year));
        }
        let month = u8::try_from(month)
            .ok()
            .and_then(|m| m.checked_sub(1))
            .ok_or_else(|| ParseError::InvalidFormat(format!("month {month}")))?;
        let day = u8::try_from(day).map_err(|_| ParseError::InvalidFormat(format!("day {day}")))?;
        CalendarDate::new(year, month, day)
    }
}

impl LocaleFormatter for EnglishFormatter {
    fn format(&self, date: &CalendarDate, pattern: &str, locale: &str) -> String {
        let mut out = String::with_capacity(pattern.len() + 8);
        for (symbol, count) in pattern_runs(pattern) {
            match (symbol, count) {
                ('y', 2) => out.push_str(&format!("{:02}", date.year().rem_euclid(100))),
                ('y', _) => out.push_str(&format!("{:04}", date.year())),
                ('M', 1) => out.push_str(&(date.month() + 1).to_string()),
                ('M', 2) => out.push_str(&format!("{:02}", date.month() + 1)),
                ('M', 3) => out.push_str(&self.month_name(date.month(), NameLength::Short, locale)),
                ('M', _) => out.push_str(&self.month_name(date.month(), NameLength::Long, locale)),
                ('d', 1) => out.push_str(&date.day().to_string()),
                ('d', _) => out.push_str(&format!("{:02}", date.day())),
                ('E', 1..=3) => {
                    out.push_str(&self.weekday_name(date.weekday(), NameLength::Short, locale));
                },
                ('E', _) => {
                    out.push_str(&self.weekday_name(date.weekday(), NameLength::Long, locale));
                },
                (other, count) => out.extend(std::iter::repeat_n(other, count)),
            }
        }
        out
    }

    fn parse(&self, text: &str, hint: Option<&str>) -> Result<CalendarDate, ParseError> {
        let key = format!("{}\u{1f}{}", text.trim(), hint.unwrap_or_default());
        if let Some(date) = self.parse_cache.borrow().get(&key) {
            tracing::trace!(text, "parse cache hit");
            return Ok(*date);
        }

        let date = match hint {
            Some(hint) => Self::parse_with_hint(text.trim(), hint)?,
            None => text.parse::<CalendarDate>()?,
        };
        let mut cache = self.parse_cache.borrow_mut();
        if cache.len() >= PARSE_CACHE_CAPACITY {
            tracing::debug!(entries = cache.len(), "flushing parse cache");
            cache.clear();
        }
        cache.insert(key, date);
        Ok(date)
    }

    fn month_name(&self, index: u8, length: NameLength, _locale: &str) -> String {
        MONTH_NAMES
            .get(usize::from(index))
            .map(|name| Self::shorten(name, length))
            .unwrap_or_default()
    }

    fn weekday_name(&self, weekday: Weekday, length: NameLength, _locale: &str) -> String {
        Self::shorten(WEEKDAY_NAMES[usize::from(weekday.index())], length)
    }
}

/// Splits a pattern into runs of identical characters
fn pattern_runs(pattern: &str) -> Vec<(char, usize)> {
    let mut runs: Vec<(char, usize)> = Vec::new();
    for c in pattern.chars() {
        match runs.last_mut() {
            Some((last, count)) if *last == c => *count += 1,
            _ => runs.push((c, 1)),
        }
    }
    runs
}
