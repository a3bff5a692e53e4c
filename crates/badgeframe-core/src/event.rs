//! Client events.
//!
//! This module defines [`ClientEvent`], the set of protocol client
//! notifications the stores react to. The host translates whatever its SDK
//! emits into these and feeds them in; the stores then re-read the client
//! for current values, so events only need to say *what* changed.

use std::collections::BTreeSet;

use crate::{DirectMap, RoomId, TagId, ThreadId, UserId};

/// Events emitted by the protocol client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Read receipt update.
    Receipt {
        /// Room the receipt is for.
        room_id: RoomId,
        /// Thread the receipt is scoped to, if any.
        thread_id: Option<ThreadId>,
        /// Users whose receipts moved.
        user_ids: Vec<UserId>,
    },

    /// Own membership changed.
    MyMembership {
        /// Room whose membership changed.
        room_id: RoomId,
    },

    /// A local echo changed status (queued, sent, failed).
    LocalEchoUpdated {
        /// Room the echo belongs to.
        room_id: RoomId,
    },

    /// New timeline event.
    Timeline {
        /// Room the event belongs to.
        room_id: RoomId,
        /// Thread the event belongs to, if any.
        thread_id: Option<ThreadId>,
    },

    /// An event was redacted.
    Redaction {
        /// Room the redaction belongs to.
        room_id: RoomId,
        /// Thread of the redacted event, if any.
        thread_id: Option<ThreadId>,
    },

    /// Server-reported unread counts changed.
    UnreadNotifications {
        /// Room whose counts changed.
        room_id: RoomId,
        /// Thread whose counts changed, if any.
        thread_id: Option<ThreadId>,
    },

    /// An encrypted event finished decrypting.
    Decrypted {
        /// Room the event belongs to.
        room_id: RoomId,
        /// Thread the event belongs to, if any.
        thread_id: Option<ThreadId>,
    },

    /// A thread was created or first seen.
    NewThread {
        /// Room containing the thread.
        room_id: RoomId,
        /// Thread root.
        thread_id: ThreadId,
    },

    /// `m.push_rules` account data changed. May change mute state anywhere.
    PushRulesChanged,

    /// The client learned about a room.
    RoomAdded {
        /// The new room.
        room_id: RoomId,
    },

    /// An `m.space.child` state event changed in a space.
    SpaceChildChanged {
        /// Space whose children changed.
        space_id: RoomId,
    },

    /// An `m.space.parent` state event changed in a room.
    SpaceParentChanged {
        /// Room whose parents changed.
        room_id: RoomId,
    },

    /// `m.tag` room account data changed.
    RoomTagsChanged {
        /// Room whose tags changed.
        room_id: RoomId,
        /// Tags before the change.
        previous: BTreeSet<TagId>,
        /// Tags after the change.
        current: BTreeSet<TagId>,
    },

    /// `m.direct` account data changed.
    DirectChanged {
        /// Content before the change.
        previous: DirectMap,
        /// Content after the change.
        current: DirectMap,
    },
}

impl ClientEvent {
    /// Room this event targets. `None` for account-wide events.
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Self::Receipt { room_id, .. }
            | Self::MyMembership { room_id }
            | Self::LocalEchoUpdated { room_id }
            | Self::Timeline { room_id, .. }
            | Self::Redaction { room_id, .. }
            | Self::UnreadNotifications { room_id, .. }
            | Self::Decrypted { room_id, .. }
            | Self::NewThread { room_id, .. }
            | Self::RoomAdded { room_id }
            | Self::SpaceParentChanged { room_id }
            | Self::RoomTagsChanged { room_id, .. } => Some(room_id),
            Self::SpaceChildChanged { space_id } => Some(space_id),
            Self::PushRulesChanged | Self::DirectChanged { .. } => None,
        }
    }

    /// Thread this event targets, if any.
    pub fn thread_id(&self) -> Option<&ThreadId> {
        match self {
            Self::Receipt { thread_id, .. }
            | Self::Timeline { thread_id, .. }
            | Self::Redaction { thread_id, .. }
            | Self::UnreadNotifications { thread_id, .. }
            | Self::Decrypted { thread_id, .. } => thread_id.as_ref(),
            Self::NewThread { thread_id, .. } => Some(thread_id),
            _ => None,
        }
    }

    /// Whether the favourite tag was added or removed.
    pub fn favourite_toggled(&self) -> bool {
        match self {
            Self::RoomTagsChanged { previous, current, .. } => {
                previous.iter().any(TagId::is_favourite) != current.iter().any(TagId::is_favourite)
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_wide_events_have_no_room() {
        assert_eq!(ClientEvent::PushRulesChanged.room_id(), None);
        let direct =
            ClientEvent::DirectChanged { previous: DirectMap::new(), current: DirectMap::new() };
        assert_eq!(direct.room_id(), None);
    }

    #[test]
    fn thread_scoped_events_expose_thread() {
        let event = ClientEvent::Timeline {
            room_id: RoomId::from("!a:example.org"),
            thread_id: Some(ThreadId::from("$root")),
        };
        assert_eq!(event.thread_id().map(ThreadId::as_str), Some("$root"));
        assert_eq!(event.room_id().map(RoomId::as_str), Some("!a:example.org"));
    }

    #[test]
    fn favourite_toggle_detection() {
        let room_id = RoomId::from("!a:example.org");
        let fav: BTreeSet<_> = [TagId::from(TagId::FAVOURITE)].into_iter().collect();
        let low: BTreeSet<_> = [TagId::from(TagId::LOW_PRIORITY)].into_iter().collect();

        let toggled = ClientEvent::RoomTagsChanged {
            room_id: room_id.clone(),
            previous: low,
            current: fav.clone(),
        };
        assert!(toggled.favourite_toggled());

        let unchanged =
            ClientEvent::RoomTagsChanged { room_id, previous: fav.clone(), current: fav };
        assert!(!unchanged.favourite_toggled());
    }
}
