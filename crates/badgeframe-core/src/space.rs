//! Space panel button badges.

use crate::{
    AggregateState, NotificationError, NotificationSnapshot, NotificationState,
    RoomNotificationState, RoomId, RoomStateFactory, SpaceKey, StateCore,
};

/// Badge for one space button, or for Home.
///
/// Same roll-up as a list section without tile counting. The room set is the
/// space's filtered room set, maintained by the space store.
#[derive(Debug, Clone)]
pub struct SpaceNotificationState {
    key: SpaceKey,
    aggregate: AggregateState,
}

impl SpaceNotificationState {
    /// Create an empty space state.
    pub fn new(key: SpaceKey, hide_bold: bool) -> Self {
        Self { key, aggregate: AggregateState::new(false, hide_bold) }
    }

    /// Space this badge belongs to.
    pub fn key(&self) -> &SpaceKey {
        &self.key
    }

    /// Rooms contributing to the badge.
    pub fn rooms(&self) -> &[RoomId] {
        self.aggregate.rooms()
    }

    /// Whether a room contributes to the badge.
    pub fn tracks(&self, room_id: &RoomId) -> bool {
        self.aggregate.tracks(room_id)
    }

    /// Replace the contributing rooms.
    pub fn set_rooms<F: RoomStateFactory + ?Sized>(
        &mut self,
        rooms: &[RoomId],
        factory: &mut F,
    ) -> Option<NotificationSnapshot> {
        self.aggregate.set_rooms(rooms, factory)
    }

    /// Recompute from child states.
    pub fn recompute<F: RoomStateFactory + ?Sized>(
        &mut self,
        factory: &F,
    ) -> Option<NotificationSnapshot> {
        self.aggregate.recompute(factory)
    }

    /// Child state of a contributing room.
    pub fn get_for_room<'f, F: RoomStateFactory + ?Sized>(
        &self,
        room_id: &RoomId,
        factory: &'f F,
    ) -> Result<&'f RoomNotificationState, NotificationError> {
        self.aggregate.get_for_room(room_id, factory)
    }

    /// Release every child.
    pub fn destroy<F: RoomStateFactory + ?Sized>(&mut self, factory: &mut F) {
        tracing::debug!(space = %self.key, "destroying space notification state");
        self.aggregate.destroy(factory);
    }

    /// Flip the display flag used by [`NotificationState::is_unread`].
    pub fn set_hide_bold(&mut self, hide_bold: bool) {
        self.aggregate.core_mut().set_hide_bold(hide_bold);
    }
}

impl NotificationState for SpaceNotificationState {
    fn core(&self) -> &StateCore {
        self.aggregate.core()
    }
}
