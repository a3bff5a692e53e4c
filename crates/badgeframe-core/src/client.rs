//! Read-only view of the protocol client.
//!
//! Sync, encryption and federation live in the protocol SDK. Notification
//! states only ever read from it through [`MatrixClient`], and learn about
//! changes through [`crate::ClientEvent`]s the host forwards. Nothing here
//! mutates SDK-owned room state.
//!
//! The client is injected into every store at construction. Before login
//! completes it may not know the current user yet; [`MatrixClient::user_id`]
//! returns `None` in that window and handlers that depend on it do nothing.

use std::{collections::BTreeMap, rc::Rc, sync::Arc};

use crate::{RoomId, TagId, ThreadId, UserId};

/// The user's membership in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Membership {
    /// Invited but not yet joined.
    Invite,
    /// Joined.
    Join,
    /// Requested to join.
    Knock,
    /// Left or was kicked.
    Leave,
    /// Banned.
    Ban,
}

/// Kind of server-reported unread count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnreadKind {
    /// Events matching a highlight push rule (mentions, keywords).
    Highlight,
    /// All notifying events, highlights included.
    Total,
}

/// Content of the `m.direct` account data event: user → DM rooms.
pub type DirectMap = BTreeMap<UserId, Vec<RoomId>>;

/// Protocol client surface consumed by the notification stores.
///
/// Methods taking a room id answer for rooms the client does not know with
/// an empty or `None` result rather than failing.
pub trait MatrixClient {
    /// Logged-in user. `None` until the client is ready.
    fn user_id(&self) -> Option<UserId>;

    /// Every room the client knows, in any membership.
    fn room_ids(&self) -> Vec<RoomId>;

    /// Rooms that should appear in the room list (joined and invited, minus
    /// upgraded rooms).
    fn visible_room_ids(&self) -> Vec<RoomId>;

    /// Own membership. `None` for unknown rooms.
    fn membership(&self, room_id: &RoomId) -> Option<Membership>;

    /// Whether the room is a space.
    fn is_space(&self, room_id: &RoomId) -> bool;

    /// Whether the room has local echoes that failed to send.
    fn has_unsent_events(&self, room_id: &RoomId) -> bool;

    /// Server-reported unread count. `None` when the server did not report
    /// one.
    fn unread_count(&self, room_id: &RoomId, kind: UnreadKind) -> Option<u64>;

    /// Whether any message after the user's read receipt is unread,
    /// regardless of push rules.
    fn has_unread_messages(&self, room_id: &RoomId) -> bool;

    /// Whether push rules mute the room.
    fn is_muted(&self, room_id: &RoomId) -> bool;

    /// Threads the client knows for the room.
    fn thread_ids(&self, room_id: &RoomId) -> Vec<ThreadId>;

    /// Per-thread unread count.
    fn thread_unread_count(
        &self,
        room_id: &RoomId,
        thread_id: &ThreadId,
        kind: UnreadKind,
    ) -> Option<u64>;

    /// Whether the thread has unread messages regardless of push rules.
    fn thread_has_unread(&self, room_id: &RoomId, thread_id: &ThreadId) -> bool;

    /// Children listed by `m.space.child` state events of a space.
    fn space_children(&self, space_id: &RoomId) -> Vec<RoomId>;

    /// Joined members of a room.
    fn joined_members(&self, room_id: &RoomId) -> Vec<UserId>;

    /// Counterpart of a DM room. `None` if the room is not a DM.
    fn dm_user_for_room(&self, room_id: &RoomId) -> Option<UserId>;

    /// DM rooms with a user.
    fn dm_rooms_for_user(&self, user_id: &UserId) -> Vec<RoomId>;

    /// Room list tags of a room.
    fn tags(&self, room_id: &RoomId) -> Vec<TagId>;
}

/// Reads an unread count, treating a missing count as zero.
pub fn unread_or_zero(count: Option<u64>) -> u64 {
    count.unwrap_or(0)
}

macro_rules! forward_client {
    ($ty:ty) => {
        impl<T: MatrixClient + ?Sized> MatrixClient for $ty {
            fn user_id(&self) -> Option<UserId> {
                (**self).user_id()
            }

            fn room_ids(&self) -> Vec<RoomId> {
                (**self).room_ids()
            }

            fn visible_room_ids(&self) -> Vec<RoomId> {
                (**self).visible_room_ids()
            }

            fn membership(&self, room_id: &RoomId) -> Option<Membership> {
                (**self).membership(room_id)
            }

            fn is_space(&self, room_id: &RoomId) -> bool {
                (**self).is_space(room_id)
            }

            fn has_unsent_events(&self, room_id: &RoomId) -> bool {
                (**self).has_unsent_events(room_id)
            }

            fn unread_count(&self, room_id: &RoomId, kind: UnreadKind) -> Option<u64> {
                (**self).unread_count(room_id, kind)
            }

            fn has_unread_messages(&self, room_id: &RoomId) -> bool {
                (**self).has_unread_messages(room_id)
            }

            fn is_muted(&self, room_id: &RoomId) -> bool {
                (**self).is_muted(room_id)
            }

            fn thread_ids(&self, room_id: &RoomId) -> Vec<ThreadId> {
                (**self).thread_ids(room_id)
            }

            fn thread_unread_count(
                &self,
                room_id: &RoomId,
                thread_id: &ThreadId,
                kind: UnreadKind,
            ) -> Option<u64> {
                (**self).thread_unread_count(room_id, thread_id, kind)
            }

            fn thread_has_unread(&self, room_id: &RoomId, thread_id: &ThreadId) -> bool {
                (**self).thread_has_unread(room_id, thread_id)
            }

            fn space_children(&self, space_id: &RoomId) -> Vec<RoomId> {
                (**self).space_children(space_id)
            }

            fn joined_members(&self, room_id: &RoomId) -> Vec<UserId> {
                (**self).joined_members(room_id)
            }

            fn dm_user_for_room(&self, room_id: &RoomId) -> Option<UserId> {
                (**self).dm_user_for_room(room_id)
            }

            fn dm_rooms_for_user(&self, user_id: &UserId) -> Vec<RoomId> {
                (**self).dm_rooms_for_user(user_id)
            }

            fn tags(&self, room_id: &RoomId) -> Vec<TagId> {
                (**self).tags(room_id)
            }
        }
    };
}

forward_client!(&T);
forward_client!(Rc<T>);
forward_client!(Arc<T>);
