//! Selection and view state machine.
//!
//! [`DatePicker`] owns the selection (single date or two-endpoint range), the
//! three-mode view (`days`, `months`, `years`), the keyboard cursor and the
//! year-grid page. Every committed change fans out synchronously to the
//! subscribed listeners, in registration order, after the change is in
//! place. Semantic notifications go to the injected [`NotificationSink`].
//!
//! View transitions:
//!
//! | From     | Trigger            | To       |
//! |----------|--------------------|----------|
//! | `days`   | month selector     | `months` |
//! | `days`   | year selector      | `years`  |
//! | `months` | month chosen       | `days`   |
//! | `months` | year selector      | `years`  |
//! | `months` | escape             | `days`   |
//! | `years`  | year chosen        | `months` |
//! | `years`  | escape             | `months` |
//!
//! Escape in `days` is left to the host (it closes the surface). Any other
//! combination is a caller bug: it trips a debug assertion and is otherwise
//! ignored.

use serde::{Deserialize, Serialize};

use crate::calendar::{self, CalendarCell, CalendarOptions, CellContext, MonthCell, YearCell};
use crate::consts::{GRID_COLUMNS, GRID_ROWS, YEAR_PAGE_SPAN};
use crate::formatter::{LocaleFormatter, NameLength};
use crate::keyboard::{self, Key, KeyAction, KeyOutcome, Modifiers};
use crate::notify::{Listeners, NotificationSink, NullSink, StateView};
use crate::prelude::*;
use crate::{CalendarDate, DateRange, DisabledPolicy, EventStore, ListenerId, PickerEvent, Weekday};

/// Whether the picker commits one date or a two-endpoint range.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    #[display(fmt = "single")]
    Single,
    #[display(fmt = "range")]
    Range,
}

/// Which grid the picker shows.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    #[display(fmt = "days")]
    Days,
    #[display(fmt = "months")]
    Months,
    #[display(fmt = "years")]
    Years,
}

/// Committed selection.
///
/// When both range endpoints are set, `range_start <= range_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionState {
    mode: SelectionMode,
    selected_date: Option<CalendarDate>,
    range_start: Option<CalendarDate>,
    range_end: Option<CalendarDate>,
    range_in_progress: bool,
}

impl SelectionState {
    pub const fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected_date: None,
            range_start: None,
            range_end: None,
            range_in_progress: false,
        }
    }

    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub const fn selected_date(&self) -> Option<CalendarDate> {
        self.selected_date
    }

    pub const fn range_start(&self) -> Option<CalendarDate> {
        self.range_start
    }

    pub const fn range_end(&self) -> Option<CalendarDate> {
        self.range_end
    }

    /// Between the first and second endpoint of a range selection
    pub const fn is_range_in_progress(&self) -> bool {
        self.range_in_progress
    }

    /// Both endpoints, once the range is complete
    pub fn completed_range(&self) -> Option<DateRange> {
        match (self.range_start, self.range_end) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        }
    }

    /// Whether `date` is the selected date or one of the range endpoints
    pub fn is_selected(&self, date: &CalendarDate) -> bool {
        match self.mode {
            SelectionMode::Single => self.selected_date == Some(*date),
            SelectionMode::Range => {
                self.range_start == Some(*date) || self.range_end == Some(*date)
            },
        }
    }

    /// The date that anchors the view when the picker opens
    pub fn anchor(&self) -> Option<CalendarDate> {
        match self.mode {
            SelectionMode::Single => self.selected_date,
            SelectionMode::Range => self.range_start,
        }
    }

    pub(crate) fn set_selected(&mut self, date: Option<CalendarDate>) {
        self.selected_date = date;
    }

    /// Sets both endpoints; a missing end leaves the range in progress
    pub(crate) fn set_range(&mut self, start: CalendarDate, end: Option<CalendarDate>) {
        match end {
            Some(end) => {
                let range = DateRange::new(start, end);
                self.range_start = Some(range.start());
                self.range_end = Some(range.end());
                self.range_in_progress = false;
            },
            None => {
                self.range_start = Some(start);
                self.range_end = None;
                self.range_in_progress = true;
            },
        }
    }

    fn clear_range(&mut self) {
        self.range_start = None;
        self.range_end = None;
        self.range_in_progress = false;
    }
}

/// What the picker displays and where the keyboard cursor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewState {
    current_view: ViewMode,
    view_date: CalendarDate,
    focused_date: CalendarDate,
    year_range_start: i32,
}

impl ViewState {
    pub const fn new(date: CalendarDate) -> Self {
        Self {
            current_view: ViewMode::Days,
            view_date: date,
            focused_date: date,
            year_range_start: calendar::year_page_start(date.year()),
        }
    }

    pub const fn current_view(&self) -> ViewMode {
        self.current_view
    }

    /// Anchor whose month and year the grids display
    pub const fn view_date(&self) -> CalendarDate {
        self.view_date
    }

    /// Keyboard cursor, independent of the selection
    pub const fn focused_date(&self) -> CalendarDate {
        self.focused_date
    }

    /// First year of the 12-year page
    pub const fn year_range_start(&self) -> i32 {
        self.year_range_start
    }

    /// Last year of the 12-year page
    pub const fn year_range_end(&self) -> i32 {
        self.year_range_start + YEAR_PAGE_SPAN - 1
    }

    fn set_view_date(&mut self, date: CalendarDate) {
        self.view_date = date;
        self.year_range_start = calendar::year_page_start(date.year());
    }

    /// Pulls the cursor into the displayed month, keeping its day where possible
    fn align_focus(&mut self) {
        if self.focused_date.same_month(&self.view_date) {
            return;
        }
        let day = self
            .focused_date
            .day()
            .min(crate::days_in_month(self.view_date.year(), self.view_date.month()));
        self.focused_date = CalendarDate::first_of_month(self.view_date.year(), self.view_date.month())
            .add_days(i64::from(day) - 1);
    }
}

/// A view-mode trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewTransition {
    /// Open the month grid
    RequestMonths,
    /// Open the year grid
    RequestYears,
    /// A month (0-based) was picked in the month grid
    ChooseMonth(u8),
    /// A year was picked in the year grid
    ChooseYear(i32),
    Escape,
}

impl ViewTransition {
    /// Whether the trigger is meaningful in view mode `from`
    pub const fn applies_in(self, from: ViewMode) -> bool {
        matches!(
            (from, self),
            (ViewMode::Days, Self::RequestMonths | Self::RequestYears | Self::Escape)
                | (
                    ViewMode::Months,
                    Self::ChooseMonth(_) | Self::RequestYears | Self::Escape
                )
                | (ViewMode::Years, Self::ChooseYear(_) | Self::Escape)
        )
    }
}

type Snapshot = (SelectionState, ViewState, bool);

/// Date picker engine: selection, view, policy and events in one place.
pub struct DatePicker {
    options: CalendarOptions,
    policy: DisabledPolicy,
    events: EventStore,
    selection: SelectionState,
    view: ViewState,
    is_open: bool,
    today: CalendarDate,
    listeners: Listeners,
    sink: Box<dyn NotificationSink>,
}

impl DatePicker {
    /// Creates a closed picker showing the month of `today`
    pub fn new(mode: SelectionMode, today: CalendarDate) -> Self {
        Self {
            options: CalendarOptions::default(),
            policy: DisabledPolicy::new(),
            events: EventStore::new(),
            selection: SelectionState::new(mode),
            view: ViewState::new(today),
            is_open: false,
            today,
            listeners: Listeners::default(),
            sink: Box::new(NullSink),
        }
    }

    /// Routes semantic notifications to `sink`
    #[must_use]
    pub fn with_sink<S>(mut self, sink: S) -> Self
    where
        S: NotificationSink + 'static,
    {
        self.sink = Box::new(sink);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: CalendarOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: DisabledPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_events(mut self, events: EventStore) -> Self {
        self.events = events;
        self
    }

    // --- accessors ---

    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    pub const fn options(&self) -> &CalendarOptions {
        &self.options
    }

    pub const fn policy(&self) -> &DisabledPolicy {
        &self.policy
    }

    pub const fn events(&self) -> &EventStore {
        &self.events
    }

    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    pub const fn today(&self) -> CalendarDate {
        self.today
    }

    pub fn is_disabled(&self, date: &CalendarDate) -> bool {
        calendar::is_disabled(date, &self.policy)
    }

    // --- listeners ---

    /// Registers a listener invoked after every committed change
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&StateView<'_>) + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // --- open / close ---

    /// Opens the surface, placing the cursor on the selection (or the view
    /// date) snapped to the nearest enabled day
    pub fn open(&mut self) {
        if self.is_open {
            return;
        }
        let before = self.snapshot();
        self.is_open = true;
        self.set_view_mode(ViewMode::Days);
        let anchor = self.selection.anchor().unwrap_or(self.view.view_date);
        let focus = keyboard::find_nearest_enabled(anchor, &self.policy).unwrap_or(anchor);
        self.view.focused_date = focus;
        self.move_view(focus);
        self.emit(PickerEvent::Opened);
        self.commit(before);
    }

    pub fn close(&mut self) {
        if !self.is_open {
            return;
        }
        let before = self.snapshot();
        self.is_open = false;
        self.emit(PickerEvent::Closed);
        self.commit(before);
    }

    // --- view modes ---

    /// Applies a view-mode trigger; returns whether the view mode changed
    pub fn transition(&mut self, transition: ViewTransition) -> bool {
        let from = self.view.current_view;
        let before = self.snapshot();
        let target = match (from, transition) {
            (ViewMode::Days, ViewTransition::RequestMonths)
            | (ViewMode::Years, ViewTransition::Escape) => Some(ViewMode::Months),
            (ViewMode::Days | ViewMode::Months, ViewTransition::RequestYears) => {
                // the page always tracks the view date
                Some(ViewMode::Years)
            },
            (ViewMode::Months, ViewTransition::ChooseMonth(month)) => {
                let date = self.view.view_date.with_month(month);
                self.move_view(date);
                self.view.align_focus();
                Some(ViewMode::Days)
            },
            (ViewMode::Months, ViewTransition::Escape) => Some(ViewMode::Days),
            (ViewMode::Years, ViewTransition::ChooseYear(year)) => {
                let date = self.view.view_date.with_year(year);
                self.move_view(date);
                self.view.align_focus();
                Some(ViewMode::Months)
            },
            (ViewMode::Days, ViewTransition::Escape) => None,
            (from, transition) => {
                tracing::warn!(?transition, view = %from, "ignoring view transition");
                debug_assert!(
                    transition.applies_in(from),
                    "view transition {transition:?} does not apply in {from}"
                );
                None
            },
        };

        let Some(target) = target else {
            return false;
        };
        self.set_view_mode(target);
        self.commit(before);
        true
    }

    /// Opens the month grid (from `days`)
    pub fn show_month_selector(&mut self) -> bool {
        self.transition(ViewTransition::RequestMonths)
    }

    /// Opens the year grid (from `days` or `months`)
    pub fn show_year_selector(&mut self) -> bool {
        self.transition(ViewTransition::RequestYears)
    }

    /// Picks a 0-based month in the month grid
    pub fn choose_month(&mut self, month: u8) -> bool {
        self.transition(ViewTransition::ChooseMonth(month))
    }

    /// Picks a year in the year grid
    pub fn choose_year(&mut self, year: i32) -> bool {
        self.transition(ViewTransition::ChooseYear(year))
    }

    /// Steps back one view level; returns `false` in `days`, where the host
    /// is expected to close instead
    pub fn escape(&mut self) -> bool {
        self.transition(ViewTransition::Escape)
    }

    // --- period navigation ---

    /// Next month, year or 12-year page depending on the view mode
    pub fn navigate_next(&mut self) {
        self.navigate(1);
    }

    /// Previous month, year or 12-year page depending on the view mode
    pub fn navigate_previous(&mut self) {
        self.navigate(-1);
    }

    fn navigate(&mut self, direction: i32) {
        let before = self.snapshot();
        let current = self.view.view_date;
        let target = match self.view.current_view {
            ViewMode::Days => current.add_months(direction),
            ViewMode::Months => current.add_years(direction),
            ViewMode::Years => current.add_years(direction * YEAR_PAGE_SPAN),
        };
        tracing::debug!(
            view = %self.view.current_view,
            from = %current,
            to = %target,
            "navigating"
        );
        self.move_view(target);
        self.view.align_focus();
        self.commit(before);
    }

    /// Shows `date`'s month and moves the cursor into it
    pub fn set_view_date(&mut self, date: CalendarDate) {
        let before = self.snapshot();
        self.move_view(date);
        self.view.align_focus();
        self.commit(before);
    }

    /// Shows today's month with the cursor on today
    pub fn go_to_today(&mut self) {
        let today = self.today;
        let before = self.snapshot();
        self.move_view(today);
        self.view.focused_date = today;
        self.commit(before);
    }

    pub fn set_today(&mut self, today: CalendarDate) {
        self.today = today;
    }

    /// Moves the keyboard cursor; the view follows when the cursor leaves
    /// the displayed month
    pub fn focus_date(&mut self, date: CalendarDate) {
        let before = self.snapshot();
        self.view.focused_date = date;
        if !date.same_month(&self.view.view_date) {
            self.move_view(date);
        }
        self.commit(before);
    }

    // --- selection ---

    /// Selects according to the selection mode; returns `false` for a disabled date
    pub fn select(&mut self, date: CalendarDate) -> bool {
        match self.selection.mode {
            SelectionMode::Single => self.select_single(date),
            SelectionMode::Range => self.select_range(date),
        }
    }

    /// Commits a single date and notifies listeners even when it was
    /// already selected; disabled dates are ignored
    pub fn select_single(&mut self, date: CalendarDate) -> bool {
        if self.is_disabled(&date) {
            tracing::debug!(date = %date, "ignoring selection of disabled date");
            return false;
        }
        self.selection.selected_date = Some(date);
        self.focus_within(date);
        self.emit(PickerEvent::DateSelected(date));
        self.notify_listeners();
        true
    }

    /// First call sets the range start, second call completes the range
    /// (swapping endpoints if needed); disabled dates are ignored
    pub fn select_range(&mut self, date: CalendarDate) -> bool {
        if self.is_disabled(&date) {
            tracing::debug!(date = %date, "ignoring range endpoint on disabled date");
            return false;
        }
        match self.selection.range_start.filter(|_| self.selection.range_in_progress) {
            Some(start) => {
                self.selection.set_range(start, Some(date));
                let range = DateRange::new(start, date);
                self.emit(PickerEvent::RangeComplete {
                    start: range.start(),
                    end: range.end(),
                });
            },
            None => {
                self.selection.set_range(date, None);
                self.emit(PickerEvent::RangeStart(date));
            },
        }
        self.focus_within(date);
        self.notify_listeners();
        true
    }

    /// Clears both range endpoints and any range in progress
    pub fn reset_range(&mut self) {
        let before = self.snapshot();
        let had_range = self.selection.range_start.is_some() || self.selection.range_end.is_some();
        self.selection.clear_range();
        if had_range {
            self.emit(PickerEvent::RangeCleared);
        }
        self.commit(before);
    }

    /// Clears the selection of the current mode; the view mode is untouched
    pub fn clear(&mut self) {
        match self.selection.mode {
            SelectionMode::Single => {
                let before = self.snapshot();
                self.selection.selected_date = None;
                self.commit(before);
            },
            SelectionMode::Range => self.reset_range(),
        }
    }

    /// Switches between single and range selection, dropping the old selection
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        if self.selection.mode == mode {
            return;
        }
        let before = self.snapshot();
        self.selection = SelectionState::new(mode);
        self.commit(before);
    }

    /// Range that would result from completing the current range at `hover`
    pub fn range_preview(&self, hover: CalendarDate) -> Option<DateRange> {
        if !self.selection.range_in_progress || self.is_disabled(&hover) {
            return None;
        }
        self.selection
            .range_start
            .map(|start| DateRange::new(start, hover))
    }

    // --- keyboard ---

    /// Maps a key press and applies it: cursor moves skip disabled days in
    /// the direction of travel, Enter/Space select the cursor, Escape steps
    /// back a view or closes.
    ///
    /// Tab is reported in the outcome and left to the caller's focus trap.
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> KeyOutcome {
        let outcome = keyboard::map_key(
            key,
            modifiers,
            self.view.focused_date,
            self.is_open,
            self.options.first_day_of_week,
        );

        match (self.view.current_view, outcome.action) {
            (_, KeyAction::Close) => {
                if !self.escape() {
                    self.close();
                }
            },
            (ViewMode::Days, KeyAction::FocusOnly) => {
                let from = self.view.focused_date;
                let target = outcome.delta.and_then(|delta| {
                    let step = from.days_until(&delta).signum();
                    keyboard::find_enabled_toward(delta, step, &self.policy)
                        .or_else(|| keyboard::find_nearest_enabled(delta, &self.policy))
                });
                if let Some(target) = target {
                    self.focus_date(target);
                }
            },
            (ViewMode::Days, KeyAction::Select) => {
                self.select(self.view.focused_date);
            },
            (ViewMode::Months, KeyAction::Select) => {
                self.choose_month(self.view.focused_date.month());
            },
            (ViewMode::Years, KeyAction::Select) => {
                self.choose_year(self.view.focused_date.year());
            },
            (ViewMode::Months | ViewMode::Years, KeyAction::FocusOnly) | (_, KeyAction::None) => {},
        }
        outcome
    }

    // --- policy, options and events ---

    /// Mutates the disabled-date policy; listeners run if it changed
    pub fn update_policy<R>(&mut self, update: impl FnOnce(&mut DisabledPolicy) -> R) -> R {
        let before = self.policy.clone();
        let result = update(&mut self.policy);
        if self.policy != before {
            self.notify_listeners();
        }
        result
    }

    /// Mutates the calendar options; listeners run if they changed
    pub fn update_options<R>(&mut self, update: impl FnOnce(&mut CalendarOptions) -> R) -> R {
        let before = self.options.clone();
        let result = update(&mut self.options);
        if self.options != before {
            self.notify_listeners();
        }
        result
    }

    pub fn set_first_day_of_week(&mut self, weekday: Weekday) {
        self.update_options(|options| options.first_day_of_week = weekday);
    }

    pub fn set_min_date(&mut self, date: Option<CalendarDate>) -> bool {
        self.update_policy(|policy| policy.set_min_date(date))
    }

    pub fn set_max_date(&mut self, date: Option<CalendarDate>) -> bool {
        self.update_policy(|policy| policy.set_max_date(date))
    }

    /// Adds event labels to `date`
    pub fn add_events<I, S>(&mut self, date: CalendarDate, labels: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let count = self.events.add_many(date, labels);
        if count > 0 {
            self.emit(PickerEvent::EventsAdded { date, count });
            self.notify_listeners();
        }
        count
    }

    /// Removes every event label of `date`
    pub fn remove_events(&mut self, date: &CalendarDate) -> bool {
        let removed = self.events.remove(date).is_some();
        if removed {
            self.emit(PickerEvent::EventsRemoved(*date));
            self.notify_listeners();
        }
        removed
    }

    pub fn clear_events(&mut self) -> bool {
        let cleared = self.events.clear();
        if cleared {
            self.emit(PickerEvent::EventsCleared);
            self.notify_listeners();
        }
        cleared
    }

    // --- rendering views ---

    /// Decorated 6×7 grid for the displayed month
    pub fn cells(&self) -> [[CalendarCell; GRID_COLUMNS]; GRID_ROWS] {
        let context = CellContext {
            today: self.today,
            first_day_of_week: self.options.first_day_of_week,
            selection: &self.selection,
            policy: &self.policy,
            events: &self.events,
        };
        calendar::month_cells(self.view.view_date.year(), self.view.view_date.month(), &context)
    }

    pub fn month_overview(&self) -> [MonthCell; 12] {
        calendar::month_overview(&self.view.view_date, &self.today, &self.policy)
    }

    pub fn year_page(&self) -> [YearCell; 12] {
        calendar::year_page(&self.view.view_date, &self.today, &self.policy)
    }

    /// Weekday header labels in display order
    pub fn weekday_labels<F>(&self, formatter: &F, length: NameLength) -> [String; GRID_COLUMNS]
    where
        F: LocaleFormatter + ?Sized,
    {
        calendar::weekday_labels(
            formatter,
            self.options.first_day_of_week,
            length,
            &self.options.locale,
        )
    }

    // --- seeding (no notifications) ---

    pub(crate) fn seed_selection(&mut self, selection: SelectionState) {
        self.selection = selection;
        if let Some(anchor) = selection.anchor() {
            self.view = ViewState::new(anchor);
        }
    }

    // --- internals ---

    fn snapshot(&self) -> Snapshot {
        (self.selection, self.view, self.is_open)
    }

    fn commit(&mut self, before: Snapshot) -> bool {
        let changed = self.snapshot() != before;
        if changed {
            self.notify_listeners();
        }
        changed
    }

    fn notify_listeners(&mut self) {
        let state = StateView {
            selection: &self.selection,
            view: &self.view,
            is_open: self.is_open,
        };
        self.listeners.notify(&state);
    }

    fn emit(&mut self, event: PickerEvent) {
        tracing::debug!(event = %event, "picker event");
        self.sink.emit(&event);
    }

    fn set_view_mode(&mut self, mode: ViewMode) {
        let from = self.view.current_view;
        if from == mode {
            return;
        }
        tracing::debug!(from = %from, to = %mode, "view mode changed");
        self.view.current_view = mode;
        self.emit(PickerEvent::ViewModeChanged { from, to: mode });
    }

    /// Moves the view anchor, announcing month and year changes
    fn move_view(&mut self, date: CalendarDate) {
        let previous = self.view.view_date;
        self.view.set_view_date(date);
        if !previous.same_month(&date) {
            self.emit(PickerEvent::MonthChanged {
                year: date.year(),
                month: date.month(),
            });
        }
        if previous.year() != date.year() {
            self.emit(PickerEvent::YearChanged { year: date.year() });
        }
    }

    /// Puts the cursor on `date`, following it with the view if needed
    fn focus_within(&mut self, date: CalendarDate) {
        self.view.focused_date = date;
        if !date.same_month(&self.view.view_date) {
            self.move_view(date);
        }
    }
}

impl std::fmt::Debug for DatePicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatePicker")
            .field("options", &self.options)
            .field("policy", &self.policy)
            .field("events", &self.events)
            .field("selection", &self.selection)
            .field("view", &self.view)
            .field("is_open", &self.is_open)
            .field("today", &self.today)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ymd;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_picker(mode: SelectionMode) -> (DatePicker, Rc<RefCell<Vec<PickerEvent>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink_events = Rc::clone(&events);
        let picker = DatePicker::new(mode, ymd(2025, 4, 15))
            .with_sink(move |event: &PickerEvent| sink_events.borrow_mut().push(event.clone()));
        (picker, events)
    }

    fn count_notifications(picker: &mut DatePicker) -> Rc<RefCell<usize>> {
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        picker.subscribe(move |_| *counter.borrow_mut() += 1);
        count
    }

    #[test]
    fn test_initial_state() {
        let picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        assert_eq!(picker.view().current_view(), ViewMode::Days);
        assert_eq!(picker.view().view_date(), ymd(2025, 4, 15));
        assert_eq!(picker.view().focused_date(), ymd(2025, 4, 15));
        assert_eq!(picker.view().year_range_start(), 2016);
        assert_eq!(picker.view().year_range_end(), 2027);
        assert!(!picker.is_open());
        assert_eq!(picker.selection().selected_date(), None);
    }

    #[test]
    fn test_select_single() {
        let (mut picker, events) = recording_picker(SelectionMode::Single);
        let notified = count_notifications(&mut picker);

        assert!(picker.select_single(ymd(2025, 4, 20)));
        assert_eq!(picker.selection().selected_date(), Some(ymd(2025, 4, 20)));
        assert_eq!(picker.view().focused_date(), ymd(2025, 4, 20));
        assert_eq!(*notified.borrow(), 1);
        assert_eq!(*events.borrow(), [PickerEvent::DateSelected(ymd(2025, 4, 20))]);
    }

    #[test]
    fn test_select_disabled_is_ignored() {
        let (mut picker, events) = recording_picker(SelectionMode::Single);
        picker.update_policy(|policy| policy.add_disabled_date(ymd(2025, 4, 20), None));
        let notified = count_notifications(&mut picker);

        assert!(!picker.select_single(ymd(2025, 4, 20)));
        assert!(!picker.select(ymd(2025, 4, 20)));
        assert_eq!(picker.selection().selected_date(), None);
        assert_eq!(*notified.borrow(), 0);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_select_range_in_order() {
        let (mut picker, events) = recording_picker(SelectionMode::Range);
        picker.select_range(ymd(2025, 4, 15));
        assert!(picker.selection().is_range_in_progress());
        assert_eq!(picker.selection().range_end(), None);

        picker.select_range(ymd(2025, 4, 20));
        let selection = picker.selection();
        assert_eq!(selection.range_start(), Some(ymd(2025, 4, 15)));
        assert_eq!(selection.range_end(), Some(ymd(2025, 4, 20)));
        assert!(!selection.is_range_in_progress());
        assert_eq!(
            *events.borrow(),
            [
                PickerEvent::RangeStart(ymd(2025, 4, 15)),
                PickerEvent::RangeComplete {
                    start: ymd(2025, 4, 15),
                    end: ymd(2025, 4, 20),
                },
            ]
        );
    }

    #[test]
    fn test_select_range_reversed_input_swaps() {
        let mut forward = DatePicker::new(SelectionMode::Range, ymd(2025, 4, 1));
        forward.select_range(ymd(2025, 4, 15));
        forward.select_range(ymd(2025, 4, 20));

        let mut reversed = DatePicker::new(SelectionMode::Range, ymd(2025, 4, 1));
        reversed.select_range(ymd(2025, 4, 20));
        reversed.select_range(ymd(2025, 4, 15));

        assert_eq!(forward.selection(), reversed.selection());
        assert_eq!(reversed.selection().range_start(), Some(ymd(2025, 4, 15)));
    }

    #[test]
    fn test_third_click_starts_new_range() {
        let mut picker = DatePicker::new(SelectionMode::Range, ymd(2025, 4, 1));
        picker.select_range(ymd(2025, 4, 15));
        picker.select_range(ymd(2025, 4, 20));
        picker.select_range(ymd(2025, 4, 25));
        assert_eq!(picker.selection().range_start(), Some(ymd(2025, 4, 25)));
        assert_eq!(picker.selection().range_end(), None);
        assert!(picker.selection().is_range_in_progress());
    }

    #[test]
    fn test_range_preview() {
        let mut picker = DatePicker::new(SelectionMode::Range, ymd(2025, 4, 1));
        assert_eq!(picker.range_preview(ymd(2025, 4, 10)), None);
        picker.select_range(ymd(2025, 4, 15));
        assert_eq!(
            picker.range_preview(ymd(2025, 4, 10)),
            Some(DateRange::new(ymd(2025, 4, 10), ymd(2025, 4, 15)))
        );
    }

    #[test]
    fn test_reset_range() {
        let (mut picker, events) = recording_picker(SelectionMode::Range);
        picker.select_range(ymd(2025, 4, 15));
        picker.reset_range();
        assert_eq!(picker.selection().range_start(), None);
        assert!(!picker.selection().is_range_in_progress());
        assert_eq!(events.borrow().last(), Some(&PickerEvent::RangeCleared));

        let emitted = events.borrow().len();
        picker.reset_range();
        assert_eq!(events.borrow().len(), emitted);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 1));
        picker.select_single(ymd(2025, 4, 15));
        picker.show_month_selector();
        let notified = count_notifications(&mut picker);

        picker.clear();
        let once = (*picker.selection(), *picker.view());
        picker.clear();
        let twice = (*picker.selection(), *picker.view());

        assert_eq!(once, twice);
        assert_eq!(picker.selection().selected_date(), None);
        assert_eq!(picker.view().current_view(), ViewMode::Months);
        assert_eq!(*notified.borrow(), 1);
    }

    #[test]
    fn test_clear_range_mode() {
        let mut picker = DatePicker::new(SelectionMode::Range, ymd(2025, 4, 1));
        picker.select_range(ymd(2025, 4, 15));
        picker.select_range(ymd(2025, 4, 20));
        picker.clear();
        assert_eq!(picker.selection().completed_range(), None);
        picker.clear();
        assert_eq!(picker.selection().range_end(), None);
    }

    #[test]
    fn test_view_transitions() {
        let (mut picker, events) = recording_picker(SelectionMode::Single);

        assert!(picker.show_month_selector());
        assert_eq!(picker.view().current_view(), ViewMode::Months);
        assert_eq!(picker.view().view_date(), ymd(2025, 4, 15));

        assert!(picker.show_year_selector());
        assert_eq!(picker.view().current_view(), ViewMode::Years);
        assert_eq!(picker.view().year_range_start(), 2016);

        assert!(picker.choose_year(2030));
        assert_eq!(picker.view().current_view(), ViewMode::Months);
        assert_eq!(picker.view().view_date().year(), 2030);
        assert_eq!(picker.view().year_range_start(), 2028);

        assert!(picker.choose_month(0));
        assert_eq!(picker.view().current_view(), ViewMode::Days);
        assert_eq!(picker.view().view_date(), ymd(2030, 1, 15));
        assert_eq!(picker.view().focused_date(), ymd(2030, 1, 15));

        assert!(events.borrow().contains(&PickerEvent::ViewModeChanged {
            from: ViewMode::Days,
            to: ViewMode::Months,
        }));
        assert!(events.borrow().contains(&PickerEvent::YearChanged { year: 2030 }));
    }

    #[test]
    fn test_days_to_years_directly() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        assert!(picker.show_year_selector());
        assert_eq!(picker.view().current_view(), ViewMode::Years);
    }

    #[test]
    fn test_escape_steps_back() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.show_year_selector();
        assert!(picker.escape());
        assert_eq!(picker.view().current_view(), ViewMode::Months);
        assert!(picker.escape());
        assert_eq!(picker.view().current_view(), ViewMode::Days);
        assert!(!picker.escape());
        assert_eq!(picker.view().current_view(), ViewMode::Days);
    }

    #[test]
    fn test_choose_month_clamps_day() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 1, 31));
        picker.show_month_selector();
        picker.choose_month(1);
        assert_eq!(picker.view().view_date(), ymd(2025, 2, 28));
    }

    #[test]
    fn test_transition_domain() {
        assert!(ViewTransition::RequestMonths.applies_in(ViewMode::Days));
        assert!(ViewTransition::ChooseMonth(3).applies_in(ViewMode::Months));
        assert!(!ViewTransition::ChooseMonth(3).applies_in(ViewMode::Days));
        assert!(!ViewTransition::RequestMonths.applies_in(ViewMode::Years));
        assert!(!ViewTransition::ChooseYear(2025).applies_in(ViewMode::Months));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "does not apply")]
    fn test_out_of_domain_transition_asserts() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.choose_month(3);
    }

    #[test]
    fn test_navigate_days_rolls_year() {
        let (mut picker, events) = recording_picker(SelectionMode::Single);
        picker.set_view_date(ymd(2025, 12, 10));
        events.borrow_mut().clear();

        picker.navigate_next();
        assert_eq!(picker.view().view_date(), ymd(2026, 1, 10));
        assert_eq!(
            *events.borrow(),
            [
                PickerEvent::MonthChanged { year: 2026, month: 0 },
                PickerEvent::YearChanged { year: 2026 },
            ]
        );

        picker.navigate_previous();
        picker.navigate_previous();
        assert_eq!(picker.view().view_date(), ymd(2025, 11, 10));
    }

    #[test]
    fn test_navigate_moves_focus_into_view() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 1, 31));
        picker.navigate_next();
        assert_eq!(picker.view().view_date(), ymd(2025, 2, 28));
        assert_eq!(picker.view().focused_date(), ymd(2025, 2, 28));
    }

    #[test]
    fn test_navigate_months_steps_years() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.show_month_selector();
        picker.navigate_next();
        assert_eq!(picker.view().view_date(), ymd(2026, 4, 15));
        picker.navigate_previous();
        picker.navigate_previous();
        assert_eq!(picker.view().view_date(), ymd(2024, 4, 15));
    }

    #[test]
    fn test_navigate_years_pages_by_twelve() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.show_year_selector();
        assert_eq!(picker.view().year_range_start(), 2016);

        picker.navigate_next();
        assert_eq!(picker.view().view_date().year(), 2037);
        assert_eq!(picker.view().year_range_start(), 2028);

        picker.navigate_previous();
        picker.navigate_previous();
        assert_eq!(picker.view().view_date().year(), 2013);
        assert_eq!(picker.view().year_range_start(), 2004);
    }

    #[test]
    fn test_open_snaps_focus_to_enabled() {
        let (mut picker, events) = recording_picker(SelectionMode::Single);
        picker.update_policy(|policy| policy.set_min_date(Some(ymd(2025, 5, 2))));
        picker.show_month_selector();
        picker.open();

        assert!(picker.is_open());
        assert_eq!(picker.view().current_view(), ViewMode::Days);
        assert_eq!(picker.view().focused_date(), ymd(2025, 5, 2));
        assert_eq!(picker.view().view_date(), ymd(2025, 5, 2));
        assert!(events.borrow().contains(&PickerEvent::Opened));

        let emitted = events.borrow().len();
        picker.open();
        assert_eq!(events.borrow().len(), emitted);

        picker.close();
        assert!(!picker.is_open());
        assert_eq!(events.borrow().last(), Some(&PickerEvent::Closed));
    }

    #[test]
    fn test_open_focuses_selection() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.select_single(ymd(2025, 6, 3));
        picker.set_view_date(ymd(2025, 4, 1));
        picker.open();
        assert_eq!(picker.view().focused_date(), ymd(2025, 6, 3));
        assert_eq!(picker.view().view_date().month(), 5);
    }

    #[test]
    fn test_handle_key_moves_focus_and_selects() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.open();

        let outcome = picker.handle_key(Key::ArrowLeft, Modifiers::empty());
        assert_eq!(outcome.delta, Some(ymd(2025, 4, 14)));
        assert_eq!(picker.view().focused_date(), ymd(2025, 4, 14));

        picker.handle_key(Key::Enter, Modifiers::empty());
        assert_eq!(picker.selection().selected_date(), Some(ymd(2025, 4, 14)));
    }

    #[test]
    fn test_handle_key_skips_disabled() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.update_policy(|policy| {
            policy.add_disabled_date(ymd(2025, 4, 16), None);
        });
        picker.open();
        picker.handle_key(Key::ArrowRight, Modifiers::empty());
        assert_eq!(picker.view().focused_date(), ymd(2025, 4, 17));
    }

    #[test]
    fn test_handle_key_skips_disabled_backwards() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 14));
        picker.update_policy(|policy| {
            policy.add_disabled_weekday(0);
            policy.add_disabled_weekday(6);
        });
        picker.open();

        // Monday -> over the weekend -> Friday
        picker.handle_key(Key::ArrowLeft, Modifiers::empty());
        assert_eq!(picker.view().focused_date(), ymd(2025, 4, 11));

        // Friday 2025-04-18 -> one week up lands on the Friday before
        picker.focus_date(ymd(2025, 4, 18));
        picker.handle_key(Key::ArrowUp, Modifiers::empty());
        assert_eq!(picker.view().focused_date(), ymd(2025, 4, 11));
    }

    #[test]
    fn test_handle_key_backwards_at_min_date_stays() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 14));
        picker.set_min_date(Some(ymd(2025, 4, 14)));
        picker.open();
        picker.handle_key(Key::ArrowLeft, Modifiers::empty());
        assert_eq!(picker.view().focused_date(), ymd(2025, 4, 14));
    }

    #[test]
    fn test_choose_far_year_clamps() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.show_year_selector();
        assert!(picker.choose_year(i32::MAX / 2));
        assert_eq!(picker.view().view_date(), ymd(9999, 4, 15));
        assert_eq!(picker.view().year_range_start(), 9996);

        picker.show_year_selector();
        picker.navigate_next();
        assert_eq!(picker.view().view_date().year(), 9999);
        picker.choose_year(i32::MIN);
        assert_eq!(picker.view().view_date(), ymd(1, 4, 15));
    }

    #[test]
    fn test_reselecting_same_date_notifies_again() {
        let (mut picker, events) = recording_picker(SelectionMode::Single);
        let notified = count_notifications(&mut picker);
        picker.select_single(ymd(2025, 4, 20));
        picker.select_single(ymd(2025, 4, 20));
        assert_eq!(*notified.borrow(), 2);
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn test_handle_key_page_down_follows_view() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 1, 31));
        picker.open();
        picker.handle_key(Key::PageDown, Modifiers::empty());
        assert_eq!(picker.view().focused_date(), ymd(2025, 2, 28));
        assert_eq!(picker.view().view_date().month(), 1);
    }

    #[test]
    fn test_handle_key_escape() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.open();
        picker.show_month_selector();

        picker.handle_key(Key::Escape, Modifiers::empty());
        assert_eq!(picker.view().current_view(), ViewMode::Days);
        assert!(picker.is_open());

        picker.handle_key(Key::Escape, Modifiers::empty());
        assert!(!picker.is_open());
    }

    #[test]
    fn test_handle_key_enter_in_month_grid() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.open();
        picker.show_month_selector();
        picker.handle_key(Key::Enter, Modifiers::empty());
        assert_eq!(picker.view().current_view(), ViewMode::Days);
        assert_eq!(picker.selection().selected_date(), None);
    }

    #[test]
    fn test_handle_key_when_closed() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        let outcome = picker.handle_key(Key::ArrowLeft, Modifiers::empty());
        assert_eq!(outcome.action, KeyAction::None);
        assert_eq!(picker.view().focused_date(), ymd(2025, 4, 15));
    }

    #[test]
    fn test_set_selection_mode_clears() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.select_single(ymd(2025, 4, 16));
        picker.set_selection_mode(SelectionMode::Range);
        assert_eq!(picker.selection().mode(), SelectionMode::Range);
        assert_eq!(picker.selection().selected_date(), None);
    }

    #[test]
    fn test_listeners_observe_committed_state() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let record = Rc::clone(&seen);
        picker.subscribe(move |state| record.borrow_mut().push(state.selection.selected_date()));

        picker.select_single(ymd(2025, 4, 18));
        picker.clear();
        assert_eq!(*seen.borrow(), [Some(ymd(2025, 4, 18)), None]);
    }

    #[test]
    fn test_unsubscribed_listener_not_called() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let id = picker.subscribe(move |_| *counter.borrow_mut() += 1);
        assert!(picker.unsubscribe(id));
        picker.select_single(ymd(2025, 4, 18));
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_event_store_notifications() {
        let (mut picker, events) = recording_picker(SelectionMode::Single);
        let notified = count_notifications(&mut picker);
        let date = ymd(2025, 4, 18);

        assert_eq!(picker.add_events(date, ["Launch", "Party"]), 2);
        assert!(picker.remove_events(&date));
        assert!(!picker.remove_events(&date));
        picker.add_events(date, ["Again"]);
        assert!(picker.clear_events());
        assert!(!picker.clear_events());

        assert_eq!(
            *events.borrow(),
            [
                PickerEvent::EventsAdded { date, count: 2 },
                PickerEvent::EventsRemoved(date),
                PickerEvent::EventsAdded { date, count: 1 },
                PickerEvent::EventsCleared,
            ]
        );
        assert_eq!(*notified.borrow(), 4);
    }

    #[test]
    fn test_policy_changes_visible_immediately() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        let notified = count_notifications(&mut picker);
        assert!(picker.set_min_date(Some(ymd(2025, 4, 10))));
        assert!(!picker.set_min_date(Some(ymd(2025, 4, 10))));
        assert!(picker.is_disabled(&ymd(2025, 4, 9)));
        assert_eq!(*notified.borrow(), 1);

        let cells = picker.cells();
        let ninth = cells
            .iter()
            .flatten()
            .find(|cell| cell.date == ymd(2025, 4, 9))
            .unwrap();
        assert!(ninth.is_disabled);
    }

    #[test]
    fn test_first_day_of_week_changes_grid() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        assert_eq!(picker.cells()[0][0].date.weekday(), Weekday::Sunday);
        picker.set_first_day_of_week(Weekday::Monday);
        assert_eq!(picker.cells()[0][0].date.weekday(), Weekday::Monday);
        let labels = picker.weekday_labels(&crate::EnglishFormatter::new(), NameLength::Short);
        assert_eq!(labels[0], "Mon");
    }

    #[test]
    fn test_go_to_today() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.set_view_date(ymd(2023, 1, 1));
        picker.go_to_today();
        assert_eq!(picker.view().view_date(), ymd(2025, 4, 15));
        assert_eq!(picker.view().focused_date(), ymd(2025, 4, 15));
    }

    #[test]
    fn test_overview_views() {
        let mut picker = DatePicker::new(SelectionMode::Single, ymd(2025, 4, 15));
        picker.set_max_date(Some(ymd(2025, 6, 30)));
        let months = picker.month_overview();
        assert!(months[6].is_disabled);
        assert!(!months[5].is_disabled);
        let years = picker.year_page();
        assert_eq!(years[0].year, 2016);
        assert!(years[10].is_disabled);
    }
}
