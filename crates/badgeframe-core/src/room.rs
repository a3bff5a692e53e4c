//! Per-room notification state.
//!
//! A [`RoomNotificationState`] derives a room badge from the client's view of
//! the room. Exactly one outcome applies, chosen in this order:
//!
//! 1. Unsent local echoes: `Unsent`, symbol `!`, count 1.
//! 2. Muted: `None`, count 0, whatever the unread counts say.
//! 3. Pending invite: `Highlight`, symbol `!`, count 1.
//! 4. Highlight count > 0: `Highlight`; total count > 0: `Notification`. The
//!    count is the total, falling back to the highlight count. Otherwise
//!    `Activity` if anything is unread, else `None`, with no count.
//!
//! Counts and symbols of the sentinel outcomes are not real counts.

use crate::{
    ClientEvent, MatrixClient, Membership, NotificationError, NotificationLevel,
    NotificationSnapshot, NotificationState, NotificationUpdate, RoomId,
    RoomThreadsNotificationState, SYMBOL_ALERT, StateCore, StateKey, ThreadNotificationState,
    UnreadKind, unread_or_zero,
};

/// Badge state of one room.
#[derive(Debug, Clone)]
pub struct RoomNotificationState {
    room_id: RoomId,
    threads: Option<RoomThreadsNotificationState>,
    core: StateCore,
}

impl RoomNotificationState {
    /// Create an idle state. `with_threads` attaches a thread roll-up.
    pub fn new(room_id: RoomId, with_threads: bool, hide_bold: bool) -> Self {
        let threads =
            with_threads.then(|| RoomThreadsNotificationState::new(room_id.clone(), hide_bold));
        Self { room_id, threads, core: StateCore::new(hide_bold) }
    }

    /// Room this state tracks.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Thread roll-up, if threads are tracked.
    pub fn threads(&self) -> Option<&RoomThreadsNotificationState> {
        self.threads.as_ref()
    }

    /// State of one thread.
    pub fn thread(
        &self,
        thread_id: &crate::ThreadId,
    ) -> Result<&ThreadNotificationState, NotificationError> {
        match &self.threads {
            Some(threads) => threads.thread(thread_id),
            None => Err(NotificationError::UnknownThread {
                room_id: self.room_id.clone(),
                thread_id: thread_id.clone(),
            }),
        }
    }

    /// Compute the initial state, including every known thread.
    pub fn initialise<C: MatrixClient>(&mut self, client: &C) -> Vec<NotificationUpdate> {
        let mut updates = match &mut self.threads {
            Some(threads) => threads.populate(client),
            None => Vec::new(),
        };
        self.push_recompute(client, &mut updates);
        updates
    }

    /// Whether this state reacts to `event`.
    ///
    /// Receipts only matter when they include the current user, which is
    /// unknown until the client is ready.
    pub fn is_interested<C: MatrixClient>(&self, client: &C, event: &ClientEvent) -> bool {
        match event {
            ClientEvent::PushRulesChanged => true,
            ClientEvent::Receipt { room_id, user_ids, .. } => {
                *room_id == self.room_id
                    && client.user_id().is_some_and(|me| user_ids.contains(&me))
            },
            ClientEvent::MyMembership { room_id }
            | ClientEvent::LocalEchoUpdated { room_id }
            | ClientEvent::Timeline { room_id, .. }
            | ClientEvent::Redaction { room_id, .. }
            | ClientEvent::UnreadNotifications { room_id, .. }
            | ClientEvent::Decrypted { room_id, .. }
            | ClientEvent::NewThread { room_id, .. } => *room_id == self.room_id,
            ClientEvent::RoomAdded { .. }
            | ClientEvent::SpaceChildChanged { .. }
            | ClientEvent::SpaceParentChanged { .. }
            | ClientEvent::RoomTagsChanged { .. }
            | ClientEvent::DirectChanged { .. } => false,
        }
    }

    /// React to a client event. Returns updates for every state that
    /// changed: threads first, then the room itself.
    pub fn handle<C: MatrixClient>(
        &mut self,
        client: &C,
        event: &ClientEvent,
    ) -> Vec<NotificationUpdate> {
        if !self.is_interested(client, event) {
            return Vec::new();
        }

        let mut updates = match (&mut self.threads, event) {
            (Some(threads), ClientEvent::PushRulesChanged) => threads.recompute_all(client),
            (Some(threads), _) => match event.thread_id() {
                Some(thread_id) => threads.recompute_thread(client, thread_id),
                None => Vec::new(),
            },
            (None, _) => Vec::new(),
        };
        self.push_recompute(client, &mut updates);
        updates
    }

    /// Recompute the room badge. Returns the new snapshot if it changed.
    pub fn recompute<C: MatrixClient>(&mut self, client: &C) -> Option<NotificationSnapshot> {
        let prior = self.core.snapshot();
        let room_id = &self.room_id;
        let membership = client.membership(room_id);

        self.core.muted = client.is_muted(room_id);
        self.core.knocked = membership == Some(Membership::Knock);

        if client.has_unsent_events(room_id) {
            self.core.level = NotificationLevel::Unsent;
            self.core.symbol = Some(SYMBOL_ALERT);
            self.core.count = 1;
        } else if self.core.muted {
            self.core.level = NotificationLevel::None;
            self.core.symbol = None;
            self.core.count = 0;
        } else if membership == Some(Membership::Invite) {
            self.core.level = NotificationLevel::Highlight;
            self.core.symbol = Some(SYMBOL_ALERT);
            self.core.count = 1;
        } else {
            let red = unread_or_zero(client.unread_count(room_id, UnreadKind::Highlight));
            let grey = unread_or_zero(client.unread_count(room_id, UnreadKind::Total));
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
                self.core.level = if client.has_unread_messages(room_id) {
                    NotificationLevel::Activity
                } else {
                    NotificationLevel::None
                };
            }

            if let Some(threads) = &self.threads {
                self.core.level = self.core.level.max_of(threads.level());
            }
        }

        let updated = self.core.emit_if_updated(prior);
        if let Some(snapshot) = &updated {
            tracing::trace!(room_id = %self.room_id, level = %snapshot.level, count = snapshot.count, "room state updated");
        }
        updated
    }

    pub(crate) fn set_hide_bold(&mut self, hide_bold: bool) {
        self.core.set_hide_bold(hide_bold);
        if let Some(threads) = &mut self.threads {
            threads.set_hide_bold(hide_bold);
        }
    }

    fn push_recompute<C: MatrixClient>(&mut self, client: &C, updates: &mut Vec<NotificationUpdate>) {
        if let Some(snapshot) = self.recompute(client) {
            updates.push(NotificationUpdate::new(StateKey::Room(self.room_id.clone()), snapshot));
        }
    }
}

impl NotificationState for RoomNotificationState {
    fn core(&self) -> &StateCore {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{ThreadId, UserId, testing::FakeClient};

    fn room() -> RoomId {
        RoomId::from("!room:example.org")
    }

    fn state(client: &FakeClient) -> RoomNotificationState {
        let mut state = RoomNotificationState::new(room(), true, false);
        state.initialise(client);
        state
    }

    #[test]
    fn grey_then_red_then_muted_then_unsent() {
        let mut client = FakeClient::default();
        client.room_mut(&room()).total = Some(3);
        let mut state = state(&client);

        assert_eq!(state.level(), NotificationLevel::Notification);
        assert_eq!(state.count(), 3);
        assert_eq!(state.symbol(), None);

        client.room_mut(&room()).highlight = Some(1);
        assert!(state.recompute(&client).is_some());
        assert_eq!(state.level(), NotificationLevel::Highlight);
        assert_eq!(state.count(), 3);

        client.room_mut(&room()).muted = true;
        state.recompute(&client);
        assert_eq!(state.level(), NotificationLevel::None);
        assert_eq!(state.count(), 0);
        assert!(state.muted());

        let data = client.room_mut(&room());
        data.muted = false;
        data.unsent = true;
        state.recompute(&client);
        assert_eq!(state.level(), NotificationLevel::Unsent);
        assert_eq!(state.symbol(), Some(SYMBOL_ALERT));
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn unsent_beats_mute() {
        let mut client = FakeClient::default();
        let data = client.room_mut(&room());
        data.muted = true;
        data.unsent = true;

        let state = state(&client);
        assert_eq!(state.level(), NotificationLevel::Unsent);
        assert!(state.muted());
    }

    #[test]
    fn invite_is_highlight_sentinel() {
        let mut client = FakeClient::default();
        client.room_mut(&room()).membership = Some(Membership::Invite);

        let state = state(&client);
        assert_eq!(state.level(), NotificationLevel::Highlight);
        assert_eq!(state.symbol(), Some(SYMBOL_ALERT));
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn missing_counts_read_as_zero() {
        let mut client = FakeClient::default();
        let data = client.room_mut(&room());
        data.highlight = None;
        data.total = None;
        data.has_unread = true;

        let state = state(&client);
        assert_eq!(state.level(), NotificationLevel::Activity);
        assert_eq!(state.count(), 0);
    }

    #[test]
    fn highlight_without_total_uses_highlight_count() {
        let mut client = FakeClient::default();
        let data = client.room_mut(&room());
        data.highlight = Some(2);
        data.total = None;

        let state = state(&client);
        assert_eq!(state.level(), NotificationLevel::Highlight);
        assert_eq!(state.count(), 2);
    }

    #[test]
    fn knock_sets_flag_without_level() {
        let mut client = FakeClient::default();
        client.room_mut(&room()).membership = Some(Membership::Knock);

        let state = state(&client);
        assert!(state.knocked());
        assert!(state.is_idle());
    }

    #[test]
    fn thread_activity_raises_room_level_but_not_count() {
        let mut client = FakeClient::default();
        client.room_mut(&room()).thread_mut(&ThreadId::from("$t")).highlight = Some(1);

        let state = state(&client);
        assert_eq!(state.level(), NotificationLevel::Highlight);
        assert_eq!(state.count(), 0);
    }

    #[test]
    fn receipts_from_others_are_ignored() {
        let mut client = FakeClient::default();
        client.user_id = Some(UserId::from("@me:example.org"));
        let mut state = state(&client);
        client.room_mut(&room()).total = Some(1);

        let other = ClientEvent::Receipt {
            room_id: room(),
            thread_id: None,
            user_ids: vec![UserId::from("@other:example.org")],
        };
        assert!(state.handle(&client, &other).is_empty());

        let mine = ClientEvent::Receipt {
            room_id: room(),
            thread_id: None,
            user_ids: vec![UserId::from("@me:example.org")],
        };
        assert_eq!(state.handle(&client, &mine).len(), 1);
    }

    #[test]
    fn receipts_before_ready_are_ignored() {
        let mut client = FakeClient::default();
        client.user_id = None;
        let mut state = state(&client);
        client.room_mut(&room()).total = Some(1);

        let receipt = ClientEvent::Receipt {
            room_id: room(),
            thread_id: None,
            user_ids: vec![UserId::from("@me:example.org")],
        };
        assert!(state.handle(&client, &receipt).is_empty());
    }

    #[test]
    fn events_for_other_rooms_are_ignored() {
        let mut client = FakeClient::default();
        let mut state = state(&client);
        client.room_mut(&room()).total = Some(1);

        let event = ClientEvent::Timeline { room_id: RoomId::from("!other:x"), thread_id: None };
        assert!(state.handle(&client, &event).is_empty());
    }

    proptest! {
        #[test]
        fn outcome_follows_precedence(
            unsent in any::<bool>(),
            muted in any::<bool>(),
            invite in any::<bool>(),
            highlight in proptest::option::of(0u64..3),
            total in proptest::option::of(0u64..5),
            has_unread in any::<bool>(),
        ) {
            let mut client = FakeClient::default();
            let data = client.room_mut(&room());
            data.unsent = unsent;
            data.muted = muted;
            data.membership = Some(if invite { Membership::Invite } else { Membership::Join });
            data.highlight = highlight;
            data.total = total;
            data.has_unread = has_unread;

            let mut state = RoomNotificationState::new(room(), false, false);
            state.recompute(&client);

            let red = highlight.unwrap_or(0);
            let grey = total.unwrap_or(0);
            let (level, count, symbol) = if unsent {
                (NotificationLevel::Unsent, 1, Some(SYMBOL_ALERT))
            } else if muted {
                (NotificationLevel::None, 0, None)
            } else if invite {
                (NotificationLevel::Highlight, 1, Some(SYMBOL_ALERT))
            } else if red > 0 {
                (NotificationLevel::Highlight, if grey > 0 { grey } else { red }, None)
            } else if grey > 0 {
                (NotificationLevel::Notification, grey, None)
            } else if has_unread {
                (NotificationLevel::Activity, 0, None)
            } else {
                (NotificationLevel::None, 0, None)
            };

            prop_assert_eq!(state.level(), level);
            prop_assert_eq!(state.count(), count);
            prop_assert_eq!(state.symbol(), symbol);
            prop_assert_eq!(state.muted(), muted);
            prop_assert_eq!(state.recompute(&client), None);
        }
    }
}
