//! Space store outputs.

use badgeframe_core::{NotificationUpdate, RoomId, SpaceKey};
use serde::Serialize;

/// Something the host should react to after a space store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SpaceAction {
    /// The space panel's root list changed.
    TopLevelSpacesChanged(Vec<RoomId>),

    /// A different space (or home, for `None`) is selected.
    SelectedSpaceChanged(Option<RoomId>),

    /// The filtered room set of a space changed by value.
    SpaceRoomsChanged(SpaceKey),

    /// Persist the selected space across sessions. `None` clears it.
    PersistActiveSpace(Option<RoomId>),

    /// Send an `m.space.child` state event adding `room_id` to `space_id`.
    SendSpaceChild {
        /// Space receiving the child.
        space_id: RoomId,
        /// Room being added.
        room_id: RoomId,
        /// Servers to join the room through.
        via: Vec<String>,
    },

    /// A space badge changed.
    Notification(NotificationUpdate),
}
