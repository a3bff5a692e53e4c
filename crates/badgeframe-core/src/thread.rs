//! Per-thread notification states.
//!
//! [`ThreadNotificationState`] mirrors a room badge for a single thread.
//! [`RoomThreadsNotificationState`] owns every thread state of one room and
//! rolls them up; the room state consults that roll-up so thread activity
//! bubbles into the room badge.

use std::collections::BTreeMap;

use crate::{
    MatrixClient, NotificationError, NotificationLevel, NotificationSnapshot, NotificationState,
    NotificationUpdate, RoomId, StateCore, StateKey, ThreadId, UnreadKind, unread_or_zero,
};

/// Badge state of one thread.
#[derive(Debug, Clone)]
pub struct ThreadNotificationState {
    room_id: RoomId,
    thread_id: ThreadId,
    core: StateCore,
}

impl ThreadNotificationState {
    /// Create an idle state.
    pub fn new(room_id: RoomId, thread_id: ThreadId, hide_bold: bool) -> Self {
        Self { room_id, thread_id, core: StateCore::new(hide_bold) }
    }

    /// Thread root.
    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    /// Room containing the thread.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Re-read the thread's counts. Returns the new snapshot if it changed.
    pub fn recompute<C: MatrixClient>(&mut self, client: &C) -> Option<NotificationSnapshot> {
        let prior = self.core.snapshot();

        let unread = |kind| {
            unread_or_zero(client.thread_unread_count(&self.room_id, &self.thread_id, kind))
        };
        let red = unread(UnreadKind::Highlight);
        let grey = unread(UnreadKind::Total);
        let true_count = if grey > 0 { grey } else { red };

        self.core.symbol = None;
        if red > 0 {
            self.core.level = NotificationLevel::Highlight;
            self.core.count = true_count;
        } else if grey > 0 {
            self.core.level = NotificationLevel::Notification;
            self.core.count = true_count;
        } else {
            self.core.count = 0;
            self.core.level = if client.thread_has_unread(&self.room_id, &self.thread_id) {
                NotificationLevel::Activity
            } else {
                NotificationLevel::None
            };
        }

        self.core.emit_if_updated(prior)
    }

    pub(crate) fn set_hide_bold(&mut self, hide_bold: bool) {
        self.core.set_hide_bold(hide_bold);
    }
}

impl NotificationState for ThreadNotificationState {
    fn core(&self) -> &StateCore {
        &self.core
    }
}

/// Roll-up of every thread in a room.
///
/// Level is the maximum thread level and count the sum of thread counts.
#[derive(Debug, Clone)]
pub struct RoomThreadsNotificationState {
    room_id: RoomId,
    threads: BTreeMap<ThreadId, ThreadNotificationState>,
    core: StateCore,
}

impl RoomThreadsNotificationState {
    /// Create an empty roll-up.
    pub fn new(room_id: RoomId, hide_bold: bool) -> Self {
        Self { room_id, threads: BTreeMap::new(), core: StateCore::new(hide_bold) }
    }

    /// Start tracking every thread the client currently knows.
    pub fn populate<C: MatrixClient>(&mut self, client: &C) -> Vec<NotificationUpdate> {
        let mut updates = Vec::new();
        for thread_id in client.thread_ids(&self.room_id) {
            self.track(client, thread_id, &mut updates);
        }
        self.push_aggregate(&mut updates);
        updates
    }

    /// Recompute one thread, tracking it first if it is new.
    pub fn recompute_thread<C: MatrixClient>(
        &mut self,
        client: &C,
        thread_id: &ThreadId,
    ) -> Vec<NotificationUpdate> {
        let mut updates = Vec::new();
        match self.threads.get_mut(thread_id) {
            Some(state) => {
                if let Some(snapshot) = state.recompute(client) {
                    updates.push(NotificationUpdate::new(
                        StateKey::Thread(self.room_id.clone(), thread_id.clone()),
                        snapshot,
                    ));
                }
            },
            None => self.track(client, thread_id.clone(), &mut updates),
        }
        self.push_aggregate(&mut updates);
        updates
    }

    /// Recompute every tracked thread.
    pub fn recompute_all<C: MatrixClient>(&mut self, client: &C) -> Vec<NotificationUpdate> {
        let mut updates = Vec::new();
        for (thread_id, state) in &mut self.threads {
            if let Some(snapshot) = state.recompute(client) {
                updates.push(NotificationUpdate::new(
                    StateKey::Thread(self.room_id.clone(), thread_id.clone()),
                    snapshot,
                ));
            }
        }
        self.push_aggregate(&mut updates);
        updates
    }

    /// State of a tracked thread.
    pub fn thread(
        &self,
        thread_id: &ThreadId,
    ) -> Result<&ThreadNotificationState, NotificationError> {
        self.threads.get(thread_id).ok_or_else(|| NotificationError::UnknownThread {
            room_id: self.room_id.clone(),
            thread_id: thread_id.clone(),
        })
    }

    /// Every tracked thread state, ordered by thread id.
    pub fn threads(&self) -> impl Iterator<Item = &ThreadNotificationState> {
        self.threads.values()
    }

    /// Number of tracked threads.
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    /// No threads tracked.
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub(crate) fn set_hide_bold(&mut self, hide_bold: bool) {
        self.core.set_hide_bold(hide_bold);
        for state in self.threads.values_mut() {
            state.set_hide_bold(hide_bold);
        }
    }

    fn track<C: MatrixClient>(
        &mut self,
        client: &C,
        thread_id: ThreadId,
        updates: &mut Vec<NotificationUpdate>,
    ) {
        if self.threads.contains_key(&thread_id) {
            return;
        }
        let hide_bold = self.core.hide_bold;
        let mut state = ThreadNotificationState::new(self.room_id.clone(), thread_id.clone(), hide_bold);
        if let Some(snapshot) = state.recompute(client) {
            updates.push(NotificationUpdate::new(
                StateKey::Thread(self.room_id.clone(), thread_id.clone()),
                snapshot,
            ));
        }
        tracing::trace!(room_id = %self.room_id, %thread_id, "tracking thread");
        self.threads.insert(thread_id, state);
    }

    fn push_aggregate(&mut self, updates: &mut Vec<NotificationUpdate>) {
        let prior = self.core.snapshot();

        let mut count = 0u64;
        let mut level = NotificationLevel::None;
        for state in self.threads.values() {
            count = count.saturating_add(state.count());
            level = level.max_of(state.level());
        }
        self.core.count = count;
        self.core.level = level;
        self.core.symbol = None;

        if let Some(snapshot) = self.core.emit_if_updated(prior) {
            updates.push(NotificationUpdate::new(StateKey::Threads(self.room_id.clone()), snapshot));
        }
    }
}

impl NotificationState for RoomThreadsNotificationState {
    fn core(&self) -> &StateCore {
        &self.core
    }
}
