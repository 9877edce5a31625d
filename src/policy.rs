//! Disabled-date registry.
//!
//! Holds the availability policy consulted by the calendar math and the
//! picker state machine: inclusive bounds, disabled weekdays, disabled
//! months, and specific dates with an optional reason. Every mutator is
//! total: re-adding is a no-op, removing something absent is a no-op, and
//! out-of-range weekday or month indices are rejected without panicking.
//! Mutators report whether the policy changed.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{is_month_index, is_weekday_index};
use crate::{CalendarDate, Weekday, calendar};

/// The combined rule set deciding whether a date can be selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledPolicy {
    min_date: Option<CalendarDate>,
    max_date: Option<CalendarDate>,
    disabled_dates: BTreeMap<CalendarDate, Option<String>>,
    disabled_weekdays: BTreeSet<Weekday>,
    disabled_months: BTreeSet<u8>,
}

impl DisabledPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `date` is unavailable under this policy
    pub fn is_disabled(&self, date: &CalendarDate) -> bool {
        calendar::is_disabled(date, self)
    }

    pub const fn min_date(&self) -> Option<CalendarDate> {
        self.min_date
    }

    pub const fn max_date(&self) -> Option<CalendarDate> {
        self.max_date
    }

    /// Sets or clears the inclusive lower bound
    pub fn set_min_date(&mut self, date: Option<CalendarDate>) -> bool {
        if self.min_date == date {
            return false;
        }
        tracing::debug!(min_date = ?date.map(|d| d.iso_key()), "disabled policy lower bound set");
        self.min_date = date;
        true
    }

    /// Sets or clears the inclusive upper bound
    pub fn set_max_date(&mut self, date: Option<CalendarDate>) -> bool {
        if self.max_date == date {
            return false;
        }
        tracing::debug!(max_date = ?date.map(|d| d.iso_key()), "disabled policy upper bound set");
        self.max_date = date;
        true
    }

    /// Clears both bounds
    pub fn clear_bounds(&mut self) -> bool {
        let min_changed = self.set_min_date(None);
        let max_changed = self.set_max_date(None);
        min_changed || max_changed
    }

    /// Disables a specific date. A date that is already disabled keeps its
    /// original reason.
    pub fn add_disabled_date(&mut self, date: CalendarDate, reason: Option<String>) -> bool {
        if self.disabled_dates.contains_key(&date) {
            return false;
        }
        self.disabled_dates.insert(date, reason);
        true
    }

    /// Disables several dates without reasons; returns whether any was new
    pub fn add_disabled_dates<I>(&mut self, dates: I) -> bool
    where
        I: IntoIterator<Item = CalendarDate>,
    {
        dates
            .into_iter()
            .fold(false, |changed, date| self.add_disabled_date(date, None) || changed)
    }

    pub fn remove_disabled_date(&mut self, date: &CalendarDate) -> bool {
        self.disabled_dates.remove(date).is_some()
    }

    pub fn clear_disabled_dates(&mut self) -> bool {
        let changed = !self.disabled_dates.is_empty();
        self.disabled_dates.clear();
        changed
    }

    /// Whether `date` was disabled explicitly (ignoring bounds, weekdays and months)
    pub fn is_date_disabled(&self, date: &CalendarDate) -> bool {
        self.disabled_dates.contains_key(date)
    }

    /// Stored reason for an explicitly disabled date
    pub fn reason(&self, date: &CalendarDate) -> Option<&str> {
        self.disabled_dates.get(date).and_then(Option::as_deref)
    }

    /// Explicitly disabled dates in ascending order, with their reasons
    pub fn disabled_dates(&self) -> impl Iterator<Item = (&CalendarDate, Option<&str>)> {
        self.disabled_dates
            .iter()
            .map(|(date, reason)| (date, reason.as_deref()))
    }

    /// Disables a weekday by index (0 = Sunday). Indices above 6 are ignored.
    pub fn add_disabled_weekday(&mut self, index: u8) -> bool {
        match Self::weekday(index) {
            Some(weekday) => self.disabled_weekdays.insert(weekday),
            None => false,
        }
    }

    pub fn remove_disabled_weekday(&mut self, index: u8) -> bool {
        match Self::weekday(index) {
            Some(weekday) => self.disabled_weekdays.remove(&weekday),
            None => false,
        }
    }

    pub fn clear_disabled_weekdays(&mut self) -> bool {
        let changed = !self.disabled_weekdays.is_empty();
        self.disabled_weekdays.clear();
        changed
    }

    pub fn is_weekday_disabled(&self, weekday: Weekday) -> bool {
        self.disabled_weekdays.contains(&weekday)
    }

    pub fn disabled_weekdays(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.disabled_weekdays.iter().copied()
    }

    /// Disables a month by 0-based index. Indices above 11 are ignored.
    pub fn add_disabled_month(&mut self, index: u8) -> bool {
        if !Self::check_month(index) {
            return false;
        }
        self.disabled_months.insert(index)
    }

    pub fn remove_disabled_month(&mut self, index: u8) -> bool {
        if !Self::check_month(index) {
            return false;
        }
        self.disabled_months.remove(&index)
    }

    pub fn clear_disabled_months(&mut self) -> bool {
        let changed = !self.disabled_months.is_empty();
        self.disabled_months.clear();
        changed
    }

    pub fn is_month_disabled(&self, index: u8) -> bool {
        self.disabled_months.contains(&index)
    }

    pub fn disabled_months(&self) -> impl Iterator<Item = u8> + '_ {
        self.disabled_months.iter().copied()
    }

    /// Resets every axis of the policy
    pub fn clear(&mut self) -> bool {
        let bounds = self.clear_bounds();
        let dates = self.clear_disabled_dates();
        let weekdays = self.clear_disabled_weekdays();
        let months = self.clear_disabled_months();
        bounds || dates || weekdays || months
    }

    fn weekday(index: u8) -> Option<Weekday> {
        if !is_weekday_index(index) {
            tracing::warn!(index, "ignoring out-of-range weekday index");
            return None;
        }
        Weekday::new(index).ok()
    }

    fn check_month(index: u8) -> bool {
        if !is_month_index(index) {
            tracing::warn!(index, "ignoring out-of-range month index");
            return false;
        }
        true
    }
}
