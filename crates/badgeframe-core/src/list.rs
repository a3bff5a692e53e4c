//! Room list section badges.

use crate::{
    AggregateState, NotificationError, NotificationSnapshot, NotificationState,
    RoomNotificationState, RoomId, RoomStateFactory, StateCore, TagId,
};

/// Badge for one room list section.
///
/// The invite section counts tiles: its badge is the number of rooms shown,
/// at `Highlight` whenever the section is non-empty.
#[derive(Debug, Clone)]
pub struct ListNotificationState {
    tag: TagId,
    aggregate: AggregateState,
}

impl ListNotificationState {
    /// Create an empty list state.
    pub fn new(tag: TagId, by_tile_count: bool, hide_bold: bool) -> Self {
        Self { tag, aggregate: AggregateState::new(by_tile_count, hide_bold) }
    }

    /// Create a list state with the counting mode its tag calls for.
    pub fn for_tag(tag: TagId, hide_bold: bool) -> Self {
        let by_tile_count = tag.is_invite();
        Self::new(tag, by_tile_count, hide_bold)
    }

    /// Section tag.
    pub fn tag(&self) -> &TagId {
        &self.tag
    }

    /// Whether the badge counts tiles.
    pub fn by_tile_count(&self) -> bool {
        self.aggregate.by_tile_count()
    }

    /// Rooms in display order.
    pub fn rooms(&self) -> &[RoomId] {
        self.aggregate.rooms()
    }

    /// Whether a room is in the section.
    pub fn tracks(&self, room_id: &RoomId) -> bool {
        self.aggregate.tracks(room_id)
    }

    /// Replace the section's rooms. See [`AggregateState::set_rooms`].
    pub fn set_rooms<F: RoomStateFactory + ?Sized>(
        &mut self,
        rooms: &[RoomId],
        factory: &mut F,
    ) -> Option<NotificationSnapshot> {
        let updated = self.aggregate.set_rooms(rooms, factory);
        tracing::debug!(tag = %self.tag, rooms = self.aggregate.tracked().len(), "list rooms set");
        updated
    }

    /// Recompute from child states.
    pub fn recompute<F: RoomStateFactory + ?Sized>(
        &mut self,
        factory: &F,
    ) -> Option<NotificationSnapshot> {
        self.aggregate.recompute(factory)
    }

    /// Child state of a room in this section.
    pub fn get_for_room<'f, F: RoomStateFactory + ?Sized>(
        &self,
        room_id: &RoomId,
        factory: &'f F,
    ) -> Result<&'f RoomNotificationState, NotificationError> {
        self.aggregate.get_for_room(room_id, factory)
    }

    /// Release every child.
    pub fn destroy<F: RoomStateFactory + ?Sized>(&mut self, factory: &mut F) {
        self.aggregate.destroy(factory);
    }

    pub(crate) fn set_hide_bold(&mut self, hide_bold: bool) {
        self.aggregate.core_mut().set_hide_bold(hide_bold);
    }
}

impl NotificationState for ListNotificationState {
    fn core(&self) -> &StateCore {
        self.aggregate.core()
    }
}
