//! State-change listeners and semantic picker notifications.
//!
//! Listeners are kept in registration order and invoked synchronously after
//! a mutation commits. Semantic [`PickerEvent`]s go to a host-provided
//! [`NotificationSink`], which owns the actual transport.

use crate::prelude::*;
use crate::{CalendarDate, SelectionState, ViewMode, ViewState};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "listener#{_0}")]
pub struct ListenerId(u64);

/// Read-only view of the committed picker state handed to listeners.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    pub selection: &'a SelectionState,
    pub view: &'a ViewState,
    pub is_open: bool,
}

type Listener = Box<dyn FnMut(&StateView<'_>)>;

/// Subscriber list invoked in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub(crate) fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&StateView<'_>) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn notify(&mut self, state: &StateView<'_>) {
        tracing::trace!(listeners = self.entries.len(), "notifying state listeners");
        for (_, listener) in &mut self.entries {
            listener(state);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("next_id", &self.next_id)
            .field("len", &self.entries.len())
            .finish()
    }
}

/// Semantically named occurrences emitted by the picker.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PickerEvent {
    #[display(fmt = "open")]
    Opened,
    #[display(fmt = "close")]
    Closed,
    /// The displayed month changed (0-based month)
    #[display(fmt = "month-changed")]
    MonthChanged { year: i32, month: u8 },
    #[display(fmt = "year-changed")]
    YearChanged { year: i32 },
    #[display(fmt = "view-mode-changed")]
    ViewModeChanged { from: ViewMode, to: ViewMode },
    #[display(fmt = "date-selected")]
    DateSelected(CalendarDate),
    #[display(fmt = "range-start")]
    RangeStart(CalendarDate),
    #[display(fmt = "range-complete")]
    RangeComplete { start: CalendarDate, end: CalendarDate },
    #[display(fmt = "range-cleared")]
    RangeCleared,
    #[display(fmt = "events-added")]
    EventsAdded { date: CalendarDate, count: usize },
    #[display(fmt = "events-removed")]
    EventsRemoved(CalendarDate),
    #[display(fmt = "events-cleared")]
    EventsCleared,
}

/// Receiver for [`PickerEvent`]s; any `FnMut(&PickerEvent)` closure qualifies.
pub trait NotificationSink {
    fn emit(&mut self, event: &PickerEvent);
}

impl<F> NotificationSink for F
where
    F: FnMut(&PickerEvent),
{
    fn emit(&mut self, event: &PickerEvent) {
        self(event);
    }
}

/// Sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NullSink;

impl NotificationSink for NullSink {
    fn emit(&mut self, _event: &PickerEvent) {}
}
