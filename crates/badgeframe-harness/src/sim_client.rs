//! Shared simulated protocol client.
//!
//! `SimClient` is a cloneable handle to one [`FakeClient`] world. The
//! notification store and the space store each hold a clone, so a mutation
//! made through the handle is visible to both, the way a real SDK client is
//! shared. Every mutator returns the [`ClientEvent`] the SDK would have
//! emitted for the change; feeding that event to the app is the caller's job.

use std::{
    cell::{Ref, RefCell},
    collections::BTreeSet,
    rc::Rc,
};

use badgeframe_core::{
    ClientEvent, DirectMap, MatrixClient, Membership, RoomId, TagId, ThreadId, UnreadKind, UserId,
    testing::FakeClient,
};

/// Cloneable handle to a simulated client world.
#[derive(Debug, Clone, Default)]
pub struct SimClient {
    world: Rc<RefCell<FakeClient>>,
}

impl SimClient {
    /// Empty world logged in as `@me:example.org`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the raw world.
    pub fn world(&self) -> Ref<'_, FakeClient> {
        self.world.borrow()
    }

    /// Mutate the raw world without emitting an event.
    pub fn with_world<R>(&self, f: impl FnOnce(&mut FakeClient) -> R) -> R {
        f(&mut self.world.borrow_mut())
    }

    /// Learn about a room with the given membership.
    pub fn add_room(&self, room_id: &RoomId, membership: Membership) -> ClientEvent {
        self.with_world(|w| w.room_mut(room_id).membership = Some(membership));
        ClientEvent::RoomAdded { room_id: room_id.clone() }
    }

    /// Learn about a joined space.
    pub fn add_space(&self, space_id: &RoomId) -> ClientEvent {
        self.with_world(|w| {
            let room = w.room_mut(space_id);
            room.is_space = true;
            room.membership = Some(Membership::Join);
        });
        ClientEvent::RoomAdded { room_id: space_id.clone() }
    }

    /// Change own membership.
    pub fn set_membership(&self, room_id: &RoomId, membership: Membership) -> ClientEvent {
        self.with_world(|w| w.room_mut(room_id).membership = Some(membership));
        ClientEvent::MyMembership { room_id: room_id.clone() }
    }

    /// Add `child` to a space's `m.space.child` events.
    pub fn link(&self, space_id: &RoomId, child: &RoomId) -> ClientEvent {
        self.with_world(|w| {
            let children = &mut w.room_mut(space_id).children;
            if !children.contains(child) {
                children.push(child.clone());
            }
        });
        ClientEvent::SpaceChildChanged { space_id: space_id.clone() }
    }

    /// Remove `child` from a space's `m.space.child` events.
    pub fn unlink(&self, space_id: &RoomId, child: &RoomId) -> ClientEvent {
        self.with_world(|w| w.room_mut(space_id).children.retain(|id| id != child));
        ClientEvent::SpaceChildChanged { space_id: space_id.clone() }
    }

    /// Receive a message in the main timeline or a thread.
    pub fn receive(&self, room_id: &RoomId, thread_id: Option<&ThreadId>, highlight: bool) -> ClientEvent {
        self.with_world(|w| {
            let room = w.room_mut(room_id);
            let (total, red, unread) = match thread_id {
                Some(thread_id) => {
                    let thread = room.thread_mut(thread_id);
                    (&mut thread.total, &mut thread.highlight, &mut thread.has_unread)
                },
                None => (&mut room.total, &mut room.highlight, &mut room.has_unread),
            };
            *total = Some(total.unwrap_or(0).saturating_add(1));
            if highlight {
                *red = Some(red.unwrap_or(0).saturating_add(1));
            }
            *unread = true;
        });
        ClientEvent::Timeline { room_id: room_id.clone(), thread_id: thread_id.cloned() }
    }

    /// Receive a message that does not notify.
    pub fn receive_quiet(&self, room_id: &RoomId) -> ClientEvent {
        self.with_world(|w| w.room_mut(room_id).has_unread = true);
        ClientEvent::Timeline { room_id: room_id.clone(), thread_id: None }
    }

    /// Send an own read receipt for the main timeline or a thread.
    pub fn read(&self, room_id: &RoomId, thread_id: Option<&ThreadId>) -> ClientEvent {
        let user_ids = self.world().user_id.iter().cloned().collect();
        self.with_world(|w| {
            let room = w.room_mut(room_id);
            match thread_id {
                Some(thread_id) => {
                    let thread = room.thread_mut(thread_id);
                    thread.total = Some(0);
                    thread.highlight = Some(0);
                    thread.has_unread = false;
                },
                None => {
                    room.total = Some(0);
                    room.highlight = Some(0);
                    room.has_unread = false;
                },
            }
        });
        ClientEvent::Receipt { room_id: room_id.clone(), thread_id: thread_id.cloned(), user_ids }
    }

    /// Change push rules for one room.
    pub fn set_muted(&self, room_id: &RoomId, muted: bool) -> ClientEvent {
        self.with_world(|w| w.room_mut(room_id).muted = muted);
        ClientEvent::PushRulesChanged
    }

    /// Mark a local echo as failed, or resend it.
    pub fn set_unsent(&self, room_id: &RoomId, unsent: bool) -> ClientEvent {
        self.with_world(|w| w.room_mut(room_id).unsent = unsent);
        ClientEvent::LocalEchoUpdated { room_id: room_id.clone() }
    }

    /// Add or remove the favourite tag.
    pub fn set_favourite(&self, room_id: &RoomId, favourite: bool) -> ClientEvent {
        let favourite_tag = TagId::from(TagId::FAVOURITE);
        let (previous, current) = self.with_world(|w| {
            let tags = &mut w.room_mut(room_id).tags;
            let previous: BTreeSet<TagId> = tags.iter().cloned().collect();
            tags.retain(|tag| *tag != favourite_tag);
            if favourite {
                tags.push(favourite_tag.clone());
            }
            (previous, tags.iter().cloned().collect())
        });
        ClientEvent::RoomTagsChanged { room_id: room_id.clone(), previous, current }
    }

    /// Mark a room as a DM with `user_id`, or clear it with `None`.
    pub fn set_direct(&self, room_id: &RoomId, user_id: Option<UserId>) -> ClientEvent {
        let previous = self.direct_map();
        self.with_world(|w| w.room_mut(room_id).dm_user = user_id);
        ClientEvent::DirectChanged { previous, current: self.direct_map() }
    }

    /// Current `m.direct` content.
    pub fn direct_map(&self) -> DirectMap {
        let mut map = DirectMap::new();
        for room_id in self.world().room_ids() {
            if let Some(user_id) = self.world().dm_user_for_room(&room_id) {
                map.entry(user_id).or_default().push(room_id);
            }
        }
        map
    }
}

impl MatrixClient for SimClient {
    fn user_id(&self) -> Option<UserId> {
        self.world().user_id()
    }

    fn room_ids(&self) -> Vec<RoomId> {
        self.world().room_ids()
    }

    fn visible_room_ids(&self) -> Vec<RoomId> {
        self.world().visible_room_ids()
    }

    fn membership(&self, room_id: &RoomId) -> Option<Membership> {
        self.world().membership(room_id)
    }

    fn is_space(&self, room_id: &RoomId) -> bool {
        self.world().is_space(room_id)
    }

    fn has_unsent_events(&self, room_id: &RoomId) -> bool {
        self.world().has_unsent_events(room_id)
    }

    fn unread_count(&self, room_id: &RoomId, kind: UnreadKind) -> Option<u64> {
        self.world().unread_count(room_id, kind)
    }

    fn has_unread_messages(&self, room_id: &RoomId) -> bool {
        self.world().has_unread_messages(room_id)
    }

    fn is_muted(&self, room_id: &RoomId) -> bool {
        self.world().is_muted(room_id)
    }

    fn thread_ids(&self, room_id: &RoomId) -> Vec<ThreadId> {
        self.world().thread_ids(room_id)
    }

    fn thread_unread_count(
        &self,
        room_id: &RoomId,
        thread_id: &ThreadId,
        kind: UnreadKind,
    ) -> Option<u64> {
        self.world().thread_unread_count(room_id, thread_id, kind)
    }

    fn thread_has_unread(&self, room_id: &RoomId, thread_id: &ThreadId) -> bool {
        self.world().thread_has_unread(room_id, thread_id)
    }

    fn space_children(&self, space_id: &RoomId) -> Vec<RoomId> {
        self.world().space_children(space_id)
    }

    fn joined_members(&self, room_id: &RoomId) -> Vec<UserId> {
        self.world().joined_members(room_id)
    }

    fn dm_user_for_room(&self, room_id: &RoomId) -> Option<UserId> {
        self.world().dm_user_for_room(room_id)
    }

    fn dm_rooms_for_user(&self, user_id: &UserId) -> Vec<RoomId> {
        self.world().dm_rooms_for_user(user_id)
    }

    fn tags(&self, room_id: &RoomId) -> Vec<TagId> {
        self.world().tags(room_id)
    }
}
