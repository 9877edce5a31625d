//! Keyboard navigation mapper.
//!
//! [`map_key`] is stateless: it receives the focused date and the picker
//! context on every call and returns what the key should do. Applying the
//! outcome is up to the caller (see `DatePicker::handle_key`).

use crate::calendar::{first_of_week, is_disabled, last_of_week};
use crate::consts::{DAYS_PER_WEEK, NEAREST_ENABLED_PROBE_LIMIT};
use crate::prelude::*;
use crate::{CalendarDate, DisabledPolicy, Weekday};

/// Keys the picker reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Space,
    Escape,
    Tab,
    /// Any key without a picker binding
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value to a [`Key`]
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Enter" => Self::Enter,
            " " | "Spacebar" | "Space" => Self::Space,
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            _ => Self::Other,
        }
    }
}

bitflags::bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT   = 0b0000_0001;
        const CONTROL = 0b0000_0010;
        const ALT     = 0b0000_0100;
        const META    = 0b0000_1000;
    }
}

/// What the host should do with a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum KeyAction {
    /// Move the keyboard cursor to `KeyOutcome::delta`
    #[display(fmt = "focus-only")]
    FocusOnly,
    /// Commit the focused date
    #[display(fmt = "select")]
    Select,
    /// Close the surface
    #[display(fmt = "close")]
    Close,
    #[default]
    #[display(fmt = "none")]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TabDirection {
    #[display(fmt = "forward")]
    Forward,
    #[display(fmt = "backward")]
    Backward,
}

/// Result of mapping one key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyOutcome {
    /// Date the keyboard cursor should move to
    pub delta: Option<CalendarDate>,
    pub action: KeyAction,
    pub tab: Option<TabDirection>,
}

impl KeyOutcome {
    const NONE: Self = Self {
        delta: None,
        action: KeyAction::None,
        tab: None,
    };

    const fn focus(date: CalendarDate) -> Self {
        Self {
            delta: Some(date),
            action: KeyAction::FocusOnly,
            tab: None,
        }
    }

    const fn action(action: KeyAction) -> Self {
        Self {
            delta: None,
            action,
            tab: None,
        }
    }
}

/// Maps a key press to a navigation delta or a semantic action.
pub fn map_key(
    key: Key,
    modifiers: Modifiers,
    focused: CalendarDate,
    is_open: bool,
    first_day_of_week: Weekday,
) -> KeyOutcome {
    if !is_open {
        return KeyOutcome::NONE;
    }

    let shift = modifiers.contains(Modifiers::SHIFT);
    match key {
        Key::ArrowLeft => KeyOutcome::focus(focused.add_days(-1)),
        Key::ArrowRight => KeyOutcome::focus(focused.add_days(1)),
        Key::ArrowUp => KeyOutcome::focus(focused.add_days(-DAYS_PER_WEEK)),
        Key::ArrowDown => KeyOutcome::focus(focused.add_days(DAYS_PER_WEEK)),
        Key::Home => KeyOutcome::focus(first_of_week(&focused, first_day_of_week)),
        Key::End => KeyOutcome::focus(last_of_week(&focused, first_day_of_week)),
        Key::PageUp if shift => KeyOutcome::focus(focused.add_years(-1)),
        Key::PageUp => KeyOutcome::focus(focused.add_months(-1)),
        Key::PageDown if shift => KeyOutcome::focus(focused.add_years(1)),
        Key::PageDown => KeyOutcome::focus(focused.add_months(1)),
        Key::Enter | Key::Space => KeyOutcome::action(KeyAction::Select),
        Key::Escape => KeyOutcome::action(KeyAction::Close),
        Key::Tab => KeyOutcome {
            tab: Some(if shift {
                TabDirection::Backward
            } else {
                TabDirection::Forward
            }),
            ..KeyOutcome::NONE
        },
        Key::Other => KeyOutcome::NONE,
    }
}

/// Closest enabled date to `date`, probing +1, -1, +2, -2, ... days.
///
/// Returns `None` when nothing within 366 days either way is enabled.
pub fn find_nearest_enabled(date: CalendarDate, policy: &DisabledPolicy) -> Option<CalendarDate> {
    if !is_disabled(&date, policy) {
        return Some(date);
    }

    let found = (1..=NEAREST_ENABLED_PROBE_LIMIT)
        .flat_map(|distance| [date.add_days(distance), date.add_days(-distance)])
        .find(|candidate| !is_disabled(candidate, policy));
    if found.is_none() {
        tracing::warn!(
            date = %date,
            limit = NEAREST_ENABLED_PROBE_LIMIT,
            "no enabled date within probe limit"
        );
    }
    found
}

/// First enabled date at or after `date` walking in the direction of `step`
/// (its sign), up to 366 days. A zero step only checks `date` itself.
pub fn find_enabled_toward(
    date: CalendarDate,
    step: i64,
    policy: &DisabledPolicy,
) -> Option<CalendarDate> {
    let step = step.signum();
    if step == 0 {
        return (!is_disabled(&date, policy)).then_some(date);
    }
    (0..=NEAREST_ENABLED_PROBE_LIMIT)
        .map(|distance| date.add_days(distance * step))
        .find(|candidate| !is_disabled(candidate, policy))
}

/// Where focus lands after a trapped Tab press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusStep<T> {
    pub target: T,
    /// Focus wrapped around the ends; the caller should suppress default tab handling
    pub wrapped: bool,
}

/// Keeps Tab and Shift+Tab cycling inside an open surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTrap<T> {
    positions: Vec<T>,
}

impl<T> FocusTrap<T>
where
    T: PartialEq + Clone,
{
    /// Creates a trap over focusable positions in tab order
    pub const fn new(positions: Vec<T>) -> Self {
        Self { positions }
    }

    pub fn positions(&self) -> &[T] {
        &self.positions
    }

    /// Moves from `active` in `direction`.
    ///
    /// Leaving the last position forward wraps to the first and leaving the
    /// first backward wraps to the last. An `active` position outside the
    /// trap is pulled back in as a wrap. Returns `None` for an empty trap.
    pub fn advance(&self, active: &T, direction: TabDirection) -> Option<FocusStep<T>> {
        let first = self.positions.first()?;
        let last = self.positions.last()?;

        let Some(index) = self.positions.iter().position(|p| p == active) else {
            let target = match direction {
                TabDirection::Forward => first,
                TabDirection::Backward => last,
            };
            return Some(FocusStep {
                target: target.clone(),
                wrapped: true,
            });
        };

        let (target, wrapped) = match direction {
            TabDirection::Forward => self
                .positions
                .get(index + 1)
                .map_or((first, true), |next| (next, false)),
            TabDirection::Backward => index
                .checked_sub(1)
                .and_then(|prev| self.positions.get(prev))
                .map_or((last, true), |prev| (prev, false)),
        };
        Some(FocusStep {
            target: target.clone(),
            wrapped,
        })
    }
}
