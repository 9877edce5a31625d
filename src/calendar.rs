//! Calendar math: month grids, week boundaries and the disabled-date predicate.
//!
//! Everything here is a pure function of its arguments and the policy
//! snapshot it is handed.

use serde::{Deserialize, Serialize};

use crate::consts::{DAYS_PER_WEEK, GRID_COLUMNS, GRID_ROWS, YEAR_PAGE_SPAN};
use crate::formatter::{LocaleFormatter, NameLength};
use crate::{CalendarDate, DisabledPolicy, EventStore, SelectionState, Weekday};

/// Locale-independent presentation options for a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarOptions {
    pub first_day_of_week: Weekday,
    /// Opaque token handed to the locale formatter
    pub locale: String,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            first_day_of_week: Weekday::Sunday,
            locale: "en-US".to_owned(),
        }
    }
}

/// One position of a month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: CalendarDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub is_disabled: bool,
    pub has_events: bool,
    pub is_range_start: bool,
    pub is_range_end: bool,
    /// Strictly between the endpoints of a completed range
    pub is_in_range: bool,
}

/// One position of the month-selection grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCell {
    /// 0-based month index
    pub month: u8,
    /// Contains today
    pub is_current: bool,
    /// Month of the view date
    pub is_selected: bool,
    pub is_disabled: bool,
}

/// One position of the year-selection grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearCell {
    pub year: i32,
    /// Contains today
    pub is_current: bool,
    /// Year of the view date
    pub is_selected: bool,
    pub is_disabled: bool,
}

/// Everything besides the date needed to decorate a grid cell.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub today: CalendarDate,
    pub first_day_of_week: Weekday,
    pub selection: &'a SelectionState,
    pub policy: &'a DisabledPolicy,
    pub events: &'a EventStore,
}

/// The 6×7 grid of days shown for a month.
///
/// The first cell is the configured first weekday on or before the 1st, and
/// each following cell is one day later.
pub fn month_grid(
    year: i32,
    month: u8,
    first_day_of_week: Weekday,
) -> [[CalendarDate; GRID_COLUMNS]; GRID_ROWS] {
    let start = first_of_week(&CalendarDate::first_of_month(year, month), first_day_of_week);
    std::array::from_fn(|row| {
        std::array::from_fn(|column| start.add_days(cell_offset(row, column)))
    })
}

#[allow(clippy::cast_possible_wrap)]
const fn cell_offset(row: usize, column: usize) -> i64 {
    (row * GRID_COLUMNS + column) as i64
}

/// Seven weekday labels starting at `first_day_of_week`.
pub fn weekday_labels<F>(
    formatter: &F,
    first_day_of_week: Weekday,
    length: NameLength,
    locale: &str,
) -> [String; GRID_COLUMNS]
where
    F: LocaleFormatter + ?Sized,
{
    std::array::from_fn(|column| {
        let weekday = first_day_of_week.offset(cell_offset(0, column));
        formatter.weekday_name(weekday, length, locale)
    })
}

/// Rolls `date` back to the first day of its week.
pub fn first_of_week(date: &CalendarDate, first_day_of_week: Weekday) -> CalendarDate {
    date.add_days(-date.weekday().days_since(first_day_of_week))
}

/// Rolls `date` forward to the last day of its week.
pub fn last_of_week(date: &CalendarDate, first_day_of_week: Weekday) -> CalendarDate {
    first_of_week(date, first_day_of_week).add_days(DAYS_PER_WEEK - 1)
}

/// Whether `date` is unavailable under `policy`. Bounds are inclusive.
pub fn is_disabled(date: &CalendarDate, policy: &DisabledPolicy) -> bool {
    policy.min_date().is_some_and(|min| *date < min)
        || policy.max_date().is_some_and(|max| *date > max)
        || policy.is_weekday_disabled(date.weekday())
        || policy.is_month_disabled(date.month())
        || policy.is_date_disabled(date)
}

/// The decorated 6×7 grid for `year`/`month`.
pub fn month_cells(
    year: i32,
    month: u8,
    context: &CellContext<'_>,
) -> [[CalendarCell; GRID_COLUMNS]; GRID_ROWS] {
    let grid = month_grid(year, month, context.first_day_of_week);
    let range = context.selection.completed_range();
    grid.map(|week| {
        week.map(|date| CalendarCell {
            date,
            is_current_month: date.year() == year && date.month() == month,
            is_today: date == context.today,
            is_selected: context.selection.is_selected(&date),
            is_disabled: is_disabled(&date, context.policy),
            has_events: context.events.has_events(&date),
            is_range_start: context.selection.range_start() == Some(date),
            is_range_end: context.selection.range_end() == Some(date),
            is_in_range: range
                .is_some_and(|r| r.start() < date && date < r.end()),
        })
    })
}

/// The twelve month cells for the year of `view_date`.
///
/// A month is disabled when its index is disabled or when every day of it
/// falls outside the bounds.
pub fn month_overview(
    view_date: &CalendarDate,
    today: &CalendarDate,
    policy: &DisabledPolicy,
) -> [MonthCell; 12] {
    let year = view_date.year();
    std::array::from_fn(|index| {
        // from_fn over 12 slots keeps the index below 12
        let month = u8::try_from(index).unwrap_or_default();
        let first = CalendarDate::first_of_month(year, month);
        let last = first.add_days(i64::from(crate::days_in_month(year, month)) - 1);
        MonthCell {
            month,
            is_current: today.year() == year && today.month() == month,
            is_selected: view_date.month() == month,
            is_disabled: policy.is_month_disabled(month) || outside_bounds(first, last, policy),
        }
    })
}

/// First year of the 12-year page containing `year`.
pub const fn year_page_start(year: i32) -> i32 {
    year.div_euclid(YEAR_PAGE_SPAN) * YEAR_PAGE_SPAN
}

/// The twelve year cells of the page containing `view_date`'s year.
pub fn year_page(
    view_date: &CalendarDate,
    today: &CalendarDate,
    policy: &DisabledPolicy,
) -> [YearCell; 12] {
    let start = year_page_start(view_date.year());
    std::array::from_fn(|index| {
        let year = start + i32::try_from(index).unwrap_or_default();
        let first = CalendarDate::first_of_month(year, crate::JANUARY);
        let last = CalendarDate::first_of_month(year, crate::DECEMBER).add_days(30);
        YearCell {
            year,
            is_current: today.year() == year,
            is_selected: view_date.year() == year,
            is_disabled: outside_bounds(first, last, policy),
        }
    })
}

fn outside_bounds(first: CalendarDate, last: CalendarDate, policy: &DisabledPolicy) -> bool {
    policy.min_date().is_some_and(|min| last < min)
        || policy.max_date().is_some_and(|max| first > max)
}
