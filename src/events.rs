use std::collections::BTreeMap;

use crate::CalendarDate;

/// Per-day event labels, keyed by ISO date (`yyyy-MM-dd`).
///
/// Labels keep their insertion order and a day holds any number of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStore {
    entries: BTreeMap<String, Vec<String>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a label to `date`
    pub fn add(&mut self, date: CalendarDate, label: impl Into<String>) {
        self.entries.entry(date.iso_key()).or_default().push(label.into());
    }

    /// Appends several labels to `date`; returns how many were added
    pub fn add_many<I, S>(&mut self, date: CalendarDate, labels: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slot = self.entries.entry(date.iso_key()).or_default();
        let before = slot.len();
        slot.extend(labels.into_iter().map(Into::into));
        let added = slot.len() - before;
        if slot.is_empty() {
            self.entries.remove(&date.iso_key());
        }
        added
    }

    /// Removes every label of `date`; returns the removed labels
    pub fn remove(&mut self, date: &CalendarDate) -> Option<Vec<String>> {
        self.entries.remove(&date.iso_key())
    }

    /// Removes the first occurrence of `label` from `date`
    pub fn remove_label(&mut self, date: &CalendarDate, label: &str) -> bool {
        let key = date.iso_key();
        let Some(labels) = self.entries.get_mut(&key) else {
            return false;
        };
        let Some(position) = labels.iter().position(|l| l == label) else {
            return false;
        };
        labels.remove(position);
        if labels.is_empty() {
            self.entries.remove(&key);
        }
        true
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.entries.is_empty();
        self.entries.clear();
        changed
    }

    /// Labels for `date` in insertion order
    pub fn labels(&self, date: &CalendarDate) -> &[String] {
        self.entries
            .get(&date.iso_key())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_events(&self, date: &CalendarDate) -> bool {
        self.entries.contains_key(&date.iso_key())
    }

    /// Number of days holding at least one label
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Days and their labels in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, labels)| (key.as_str(), labels.as_slice()))
    }
}
