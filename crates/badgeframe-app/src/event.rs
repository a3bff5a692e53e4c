//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two sources:
//! - The protocol client, wrapped in [`AppEvent::Client`], plus its
//!   readiness transitions.
//! - The UI: room list sections being laid out, room navigation, space
//!   selection and settings changes.

use badgeframe_core::{ClientEvent, RoomId, TagId};

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Client finished its initial sync.
    Ready {
        /// Space selected when the previous session ended.
        last_space: Option<RoomId>,
    },

    /// Client logged out or lost its session.
    NotReady,

    /// Event from the protocol client.
    Client(ClientEvent),

    /// A room list section was laid out with these rooms.
    SetListRooms {
        /// Section tag.
        tag: TagId,
        /// Rooms in display order.
        rooms: Vec<RoomId>,
    },

    /// A room list section is no longer shown.
    RemoveList {
        /// Section tag.
        tag: TagId,
    },

    /// User opened a room.
    ViewRoom {
        /// Room opened.
        room_id: RoomId,
    },

    /// User picked a space in the panel. `None` selects home.
    SetActiveSpace {
        /// Space selected.
        space: Option<RoomId>,
    },

    /// A value in the app's settings store changed.
    SettingsChanged,
}
