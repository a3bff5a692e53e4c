//! Client double for unit tests.
//!
//! Plain data behind the [`MatrixClient`] trait: tests set fields directly and
//! then send the event a real SDK would have emitted.

use std::collections::{BTreeMap, HashMap};

use crate::{MatrixClient, Membership, RoomId, TagId, ThreadId, UnreadKind, UserId};

/// Thread data.
#[derive(Debug, Clone, Default)]
pub struct FakeThread {
    /// Highlight count.
    pub highlight: Option<u64>,
    /// Total count.
    pub total: Option<u64>,
    /// Unread without notification.
    pub has_unread: bool,
}

/// Room data. Defaults to a joined room with zero counts.
#[derive(Debug, Clone)]
pub struct FakeRoom {
    /// Own membership.
    pub membership: Option<Membership>,
    /// Room is a space.
    pub is_space: bool,
    /// Has unsent local echoes.
    pub unsent: bool,
    /// Highlight count.
    pub highlight: Option<u64>,
    /// Total count.
    pub total: Option<u64>,
    /// Unread without notification.
    pub has_unread: bool,
    /// Push rules mute the room.
    pub muted: bool,
    /// Threads by root.
    pub threads: BTreeMap<ThreadId, FakeThread>,
    /// `m.space.child` targets, for spaces.
    pub children: Vec<RoomId>,
    /// Joined members.
    pub members: Vec<UserId>,
    /// Room tags.
    pub tags: Vec<TagId>,
    /// DM counterpart.
    pub dm_user: Option<UserId>,
}

impl Default for FakeRoom {
    fn default() -> Self {
        Self {
            membership: Some(Membership::Join),
            is_space: false,
            unsent: false,
            highlight: Some(0),
            total: Some(0),
            has_unread: false,
            muted: false,
            threads: BTreeMap::new(),
            children: Vec::new(),
            members: Vec::new(),
            tags: Vec::new(),
            dm_user: None,
        }
    }
}

impl FakeRoom {
    /// Thread data, created on first access.
    pub fn thread_mut(&mut self, thread_id: &ThreadId) -> &mut FakeThread {
        self.threads.entry(thread_id.clone()).or_default()
    }
}

/// Client double. Logged in as `@me:example.org` by default.
#[derive(Debug, Clone)]
pub struct FakeClient {
    /// Logged-in user. `None` while not ready.
    pub user_id: Option<UserId>,
    /// Rooms by id.
    pub rooms: HashMap<RoomId, FakeRoom>,
}

impl Default for FakeClient {
    fn default() -> Self {
        Self { user_id: Some(UserId::from("@me:example.org")), rooms: HashMap::new() }
    }
}

impl FakeClient {
    /// Room data, created as a joined room on first access.
    pub fn room_mut(&mut self, room_id: &RoomId) -> &mut FakeRoom {
        self.rooms.entry(room_id.clone()).or_default()
    }

    fn room(&self, room_id: &RoomId) -> Option<&FakeRoom> {
        self.rooms.get(room_id)
    }

    fn thread(&self, room_id: &RoomId, thread_id: &ThreadId) -> Option<&FakeThread> {
        self.room(room_id).and_then(|r| r.threads.get(thread_id))
    }
}

impl MatrixClient for FakeClient {
    fn user_id(&self) -> Option<UserId> {
        self.user_id.clone()
    }

    fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<_> = self.rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn visible_room_ids(&self) -> Vec<RoomId> {
        self.room_ids()
            .into_iter()
            .filter(|id| {
                matches!(
                    self.membership(id),
                    Some(Membership::Join | Membership::Invite)
                )
            })
            .collect()
    }

    fn membership(&self, room_id: &RoomId) -> Option<Membership> {
        self.room(room_id).and_then(|r| r.membership)
    }

    fn is_space(&self, room_id: &RoomId) -> bool {
        self.room(room_id).is_some_and(|r| r.is_space)
    }

    fn has_unsent_events(&self, room_id: &RoomId) -> bool {
        self.room(room_id).is_some_and(|r| r.unsent)
    }

    fn unread_count(&self, room_id: &RoomId, kind: UnreadKind) -> Option<u64> {
        let room = self.room(room_id)?;
        match kind {
            UnreadKind::Highlight => room.highlight,
            UnreadKind::Total => room.total,
        }
    }

    fn has_unread_messages(&self, room_id: &RoomId) -> bool {
        self.room(room_id).is_some_and(|r| r.has_unread)
    }

    fn is_muted(&self, room_id: &RoomId) -> bool {
        self.room(room_id).is_some_and(|r| r.muted)
    }

    fn thread_ids(&self, room_id: &RoomId) -> Vec<ThreadId> {
        self.room(room_id).map(|r| r.threads.keys().cloned().collect()).unwrap_or_default()
    }

    fn thread_unread_count(
        &self,
        room_id: &RoomId,
        thread_id: &ThreadId,
        kind: UnreadKind,
    ) -> Option<u64> {
        let thread = self.thread(room_id, thread_id)?;
        match kind {
            UnreadKind::Highlight => thread.highlight,
            UnreadKind::Total => thread.total,
        }
    }

    fn thread_has_unread(&self, room_id: &RoomId, thread_id: &ThreadId) -> bool {
        self.thread(room_id, thread_id).is_some_and(|t| t.has_unread)
    }

    fn space_children(&self, space_id: &RoomId) -> Vec<RoomId> {
        self.room(space_id).map(|r| r.children.clone()).unwrap_or_default()
    }

    fn joined_members(&self, room_id: &RoomId) -> Vec<UserId> {
        self.room(room_id).map(|r| r.members.clone()).unwrap_or_default()
    }

    fn dm_user_for_room(&self, room_id: &RoomId) -> Option<UserId> {
        self.room(room_id).and_then(|r| r.dm_user.clone())
    }

    fn dm_rooms_for_user(&self, user_id: &UserId) -> Vec<RoomId> {
        let mut ids: Vec<_> = self
            .rooms
            .iter()
            .filter(|(_, r)| r.dm_user.as_ref() == Some(user_id))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    fn tags(&self, room_id: &RoomId) -> Vec<TagId> {
        self.room(room_id).map(|r| r.tags.clone()).unwrap_or_default()
    }
}
