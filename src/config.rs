//! Host configuration.
//!
//! [`PickerConfig`] is the serde form of everything a host can hand the
//! picker up front. Dates are ISO strings, weekday and month indices are
//! numbers. Keys are camelCase and every field is optional.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarOptions;
use crate::state::{DatePicker, SelectionMode, SelectionState};
use crate::{
    CalendarDate, DateRange, DisabledPolicy, EventStore, MAX_MONTH_INDEX, MAX_WEEKDAY_INDEX,
    ParseError, Weekday,
};

/// Error type for invalid picker configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A date string could not be parsed.
    #[error(transparent)]
    ParseError(#[from] ParseError),

    #[error("Weekday index {0} is out of range 0-6")]
    InvalidWeekday(u8),

    #[error("Month index {0} is out of range 0-11")]
    InvalidMonth(u8),

    /// The initial selection does not fit the selection mode.
    #[error("{field} cannot be used in {mode} selection mode")]
    ModeMismatch {
        field: &'static str,
        mode:  SelectionMode,
    },

    /// The initial selection lands on a disabled date.
    #[error("Initial selection {0} is disabled")]
    DisabledSelection(CalendarDate),
}

/// A disabled date with an optional human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabledDate {
    pub date:   CalendarDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Serializable picker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PickerConfig {
    pub mode:               SelectionMode,
    pub min_date:           Option<CalendarDate>,
    pub max_date:           Option<CalendarDate>,
    pub first_day_of_week:  Weekday,
    pub locale:             Option<String>,
    pub disabled_dates:     Vec<DisabledDate>,
    pub disabled_weekdays:  Vec<u8>,
    pub disabled_months:    Vec<u8>,
    /// Event labels keyed by ISO date
    pub events:             BTreeMap<String, Vec<String>>,
    pub selected_date:      Option<CalendarDate>,
    pub selected_range:     Option<DateRange>,
    /// Overrides the system clock's today
    pub today:              Option<CalendarDate>,
}

impl PickerConfig {
    /// Builds a closed picker showing the initial selection, or today.
    ///
    /// # Errors
    /// Returns a `ConfigError` when an index is out of range, an event key
    /// is not an ISO date, or the initial selection is disabled or does not
    /// match the mode.
    pub fn build(&self) -> Result<DatePicker, ConfigError> {
        tracing::debug!(
            mode = %self.mode,
            disabled_dates = self.disabled_dates.len(),
            event_days = self.events.len(),
            "building picker from config"
        );

        let policy = self.policy()?;
        let events = self.event_store()?;
        let selection = self.selection(&policy)?;
        let options = CalendarOptions {
            first_day_of_week: self.first_day_of_week,
            locale:            self
                .locale
                .clone()
                .unwrap_or_else(|| CalendarOptions::default().locale),
        };

        let today = self.today.unwrap_or_else(CalendarDate::today);
        let mut picker = DatePicker::new(self.mode, today)
            .with_options(options)
            .with_policy(policy)
            .with_events(events);
        picker.seed_selection(selection);
        Ok(picker)
    }

    fn policy(&self) -> Result<DisabledPolicy, ConfigError> {
        let mut policy = DisabledPolicy::new();
        policy.set_min_date(self.min_date);
        policy.set_max_date(self.max_date);
        for entry in &self.disabled_dates {
            policy.add_disabled_date(entry.date, entry.reason.clone());
        }
        for &index in &self.disabled_weekdays {
            if index > MAX_WEEKDAY_INDEX {
                return Err(ConfigError::InvalidWeekday(index));
            }
            policy.add_disabled_weekday(index);
        }
        for &index in &self.disabled_months {
            if index > MAX_MONTH_INDEX {
                return Err(ConfigError::InvalidMonth(index));
            }
            policy.add_disabled_month(index);
        }
        Ok(policy)
    }

    fn event_store(&self) -> Result<EventStore, ConfigError> {
        let mut store = EventStore::new();
        for (key, labels) in &self.events {
            let date = key.parse::<CalendarDate>()?;
            store.add_many(date, labels.iter().cloned());
        }
        Ok(store)
    }

    fn selection(&self, policy: &DisabledPolicy) -> Result<SelectionState, ConfigError> {
        let mut selection = SelectionState::new(self.mode);
        match (self.mode, self.selected_date, self.selected_range) {
            (SelectionMode::Single, _, Some(_)) => {
                return Err(ConfigError::ModeMismatch {
                    field: "selectedRange",
                    mode:  self.mode,
                });
            },
            (SelectionMode::Range, Some(_), _) => {
                return Err(ConfigError::ModeMismatch {
                    field: "selectedDate",
                    mode:  self.mode,
                });
            },
            (SelectionMode::Single, Some(date), None) => {
                if policy.is_disabled(&date) {
                    return Err(ConfigError::DisabledSelection(date));
                }
                selection.set_selected(Some(date));
            },
            (SelectionMode::Range, None, Some(range)) => {
                for endpoint in [range.start(), range.end()] {
                    if policy.is_disabled(&endpoint) {
                        return Err(ConfigError::DisabledSelection(endpoint));
                    }
                }
                selection.set_range(range.start(), Some(range.end()));
            },
            (_, None, None) => {},
        }
        Ok(selection)
    }
}
