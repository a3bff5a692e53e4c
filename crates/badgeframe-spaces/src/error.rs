//! Space store errors.

use badgeframe_core::RoomId;
use thiserror::Error;

/// Errors from space store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// The room is not a space the user has joined.
    #[error("not a joined space: {room_id}")]
    NotASpace {
        /// Room that was expected to be a space.
        room_id: RoomId,
    },

    /// Spaces are turned off.
    #[error("spaces are disabled")]
    Disabled,
}

impl SpaceError {
    /// Returns true if retrying after a settings change could succeed.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}
