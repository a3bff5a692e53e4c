//! Error types for notification state lookups.
//!
//! Every variant is a caller bug: asking a list or registry for something it
//! was never told to track. They propagate to the caller rather than being
//! rendered anywhere.

use thiserror::Error;

use crate::{RoomId, TagId, ThreadId};

/// Errors raised by notification state lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// Room was never passed to `set_rooms` (or has been released).
    #[error("unknown room for notification state: {room_id}")]
    UnknownRoom {
        /// Room that was looked up.
        room_id: RoomId,
    },

    /// Thread is not tracked by its room.
    #[error("unknown thread {thread_id} in room {room_id}")]
    UnknownThread {
        /// Room containing the thread.
        room_id: RoomId,
        /// Thread that was looked up.
        thread_id: ThreadId,
    },

    /// No list state exists for the tag.
    #[error("no list notification state for tag {tag}")]
    UnknownList {
        /// Tag that was looked up.
        tag: TagId,
    },
}

impl NotificationError {
    /// Returns true if this error indicates a lookup of an untracked id.
    ///
    /// Callers are expected to check membership before looking up, so these
    /// are never recoverable at runtime.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownRoom { .. } | Self::UnknownThread { .. } | Self::UnknownList { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untracked_lookups_are_programming_errors() {
        let err = NotificationError::UnknownRoom { room_id: RoomId::from("!a:example.org") };
        assert!(err.is_programming_error());
        assert_eq!(err.to_string(), "unknown room for notification state: !a:example.org");

        let err = NotificationError::UnknownThread {
            room_id: RoomId::from("!a:example.org"),
            thread_id: ThreadId::from("$t"),
        };
        assert!(err.is_programming_error());
        assert_eq!(err.to_string(), "unknown thread $t in room !a:example.org");
    }
}
