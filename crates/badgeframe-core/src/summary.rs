//! Global roll-up across rooms.

use crate::{
    NotificationLevel, NotificationSnapshot, NotificationState, RoomNotificationState,
    StateCore,
};

/// Sum of every room state, used for the window title and tray badge.
///
/// Besides the usual snapshot it counts how many rooms have a numeric badge.
/// That counter is not part of the snapshot.
#[derive(Debug, Clone, Default)]
pub struct SummarizedNotificationState {
    core: StateCore,
    num_unread_states: usize,
}

impl SummarizedNotificationState {
    /// Create an idle summary.
    pub fn new(hide_bold: bool) -> Self {
        Self { core: StateCore::new(hide_bold), num_unread_states: 0 }
    }

    /// Rooms at `Notification` or above in the last recompute.
    pub fn num_unread_states(&self) -> usize {
        self.num_unread_states
    }

    /// Recompute from `states`. Returns the new snapshot if it changed.
    pub fn recompute<'a, I>(&mut self, states: I) -> Option<NotificationSnapshot>
    where
        I: IntoIterator<Item = &'a RoomNotificationState>,
    {
        let prior = self.core.snapshot();

        let mut count = 0u64;
        let mut level = NotificationLevel::None;
        let mut unread = 0usize;
        for state in states {
            count = count.saturating_add(state.count());
            level = level.max_of(state.level());
            if state.has_unread_count() {
                unread += 1;
            }
        }

        self.core.count = count;
        self.core.level = level;
        self.core.symbol = None;
        self.num_unread_states = unread;

        self.core.emit_if_updated(prior)
    }

    pub(crate) fn set_hide_bold(&mut self, hide_bold: bool) {
        self.core.set_hide_bold(hide_bold);
    }

    pub(crate) fn clear(&mut self) {
        self.core.clear();
        self.num_unread_states = 0;
    }
}

impl NotificationState for SummarizedNotificationState {
    fn core(&self) -> &StateCore {
        &self.core
    }
}
