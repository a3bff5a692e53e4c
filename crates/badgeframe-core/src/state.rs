//! The read-only notification state contract.
//!
//! Every badge in the UI is backed by a type implementing
//! [`NotificationState`]. Implementations keep their backing fields in a
//! [`StateCore`] and, after each recomputation, hand the prior snapshot to
//! [`StateCore::emit_if_updated`]. That comparison is the only debouncing in
//! the system: an update is reported exactly when one of the snapshot fields
//! changed.

use serde::Serialize;

use crate::NotificationLevel;

/// Symbol shown instead of a count for sentinel states (unsent, invite).
pub const SYMBOL_ALERT: &str = "!";

/// Immutable view of a notification state at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationSnapshot {
    /// Symbol replacing the count. `None` to show the count.
    pub symbol: Option<&'static str>,
    /// Badge count.
    pub count: u64,
    /// Badge severity.
    pub level: NotificationLevel,
    /// Room is muted.
    pub muted: bool,
    /// Room is a pending knock.
    pub knocked: bool,
}

/// Backing fields shared by every notification state.
#[derive(Debug, Clone, Default)]
pub struct StateCore {
    pub(crate) symbol: Option<&'static str>,
    pub(crate) count: u64,
    pub(crate) level: NotificationLevel,
    pub(crate) muted: bool,
    pub(crate) knocked: bool,
    /// Display flag from the `hide_bold` setting. Not part of the snapshot.
    pub(crate) hide_bold: bool,
}

impl StateCore {
    /// Empty state with the given display flag.
    pub fn new(hide_bold: bool) -> Self {
        Self { hide_bold, ..Self::default() }
    }

    /// Current field values.
    pub fn snapshot(&self) -> NotificationSnapshot {
        NotificationSnapshot {
            symbol: self.symbol,
            count: self.count,
            level: self.level,
            muted: self.muted,
            knocked: self.knocked,
        }
    }

    /// Compare against `prior` and return the new snapshot if any field
    /// differs.
    pub fn emit_if_updated(&self, prior: NotificationSnapshot) -> Option<NotificationSnapshot> {
        let current = self.snapshot();
        (current != prior).then_some(current)
    }

    /// Reset every field to the idle state, keeping the display flag.
    pub(crate) fn clear(&mut self) {
        *self = Self::new(self.hide_bold);
    }

    pub(crate) fn set_hide_bold(&mut self, hide_bold: bool) {
        self.hide_bold = hide_bold;
    }
}

/// Read-only surface consumed by badge renderers.
pub trait NotificationState {
    /// Backing fields.
    fn core(&self) -> &StateCore;

    /// Current field values.
    fn snapshot(&self) -> NotificationSnapshot {
        self.core().snapshot()
    }

    /// Symbol replacing the count.
    fn symbol(&self) -> Option<&'static str> {
        self.core().symbol
    }

    /// Badge count.
    fn count(&self) -> u64 {
        self.core().count
    }

    /// Badge severity.
    fn level(&self) -> NotificationLevel {
        self.core().level
    }

    /// Room is muted.
    fn muted(&self) -> bool {
        self.core().muted
    }

    /// Room is a pending knock.
    fn knocked(&self) -> bool {
        self.core().knocked
    }

    /// Nothing to show.
    fn is_idle(&self) -> bool {
        self.level() <= NotificationLevel::None
    }

    /// Whether the room should render as unread.
    ///
    /// With `hide_bold` set, activity alone no longer counts as unread. The
    /// level itself is left untouched.
    fn is_unread(&self) -> bool {
        let core = self.core();
        if core.level > NotificationLevel::Activity {
            true
        } else {
            core.level == NotificationLevel::Activity && !core.hide_bold
        }
    }

    /// A numeric badge is shown.
    fn has_unread_count(&self) -> bool {
        self.level() >= NotificationLevel::Notification
    }

    /// Mention-level badge.
    fn has_mentions(&self) -> bool {
        self.level() >= NotificationLevel::Highlight
    }
}
