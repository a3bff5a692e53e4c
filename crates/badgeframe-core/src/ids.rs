//! Identifier newtypes.
//!
//! Rooms, threads, users and tags are all identified by opaque strings owned
//! by the homeserver. Wrapping them keeps a room id from being passed where a
//! user id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Raw identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id! {
    /// Room identifier (`!opaque:server`). Spaces are rooms too.
    RoomId
}

string_id! {
    /// Thread root event identifier (`$event`).
    ThreadId
}

string_id! {
    /// User identifier (`@localpart:server`).
    UserId
}

string_id! {
    /// Room list tag identifier.
    ///
    /// Real tags come from room account data (`m.favourite`); the room list
    /// also uses synthetic tags for sections that are not tags on the server.
    TagId
}

impl TagId {
    /// Favourite rooms.
    pub const FAVOURITE: &'static str = "m.favourite";
    /// Low priority rooms.
    pub const LOW_PRIORITY: &'static str = "m.lowpriority";
    /// Server notice rooms.
    pub const SERVER_NOTICE: &'static str = "m.server_notice";
    /// Pending invites.
    pub const INVITE: &'static str = "im.vector.fake.invite";
    /// Direct messages.
    pub const DM: &'static str = "im.vector.fake.direct";
    /// Everything without a more specific tag.
    pub const UNTAGGED: &'static str = "im.vector.fake.recent";
    /// Rooms the user has left.
    pub const ARCHIVED: &'static str = "im.vector.fake.archived";

    /// Whether this is the favourite tag.
    pub fn is_favourite(&self) -> bool {
        self.0 == Self::FAVOURITE
    }

    /// Whether this is the invite section.
    pub fn is_invite(&self) -> bool {
        self.0 == Self::INVITE
    }
}

/// Key of a node in the space panel.
///
/// `Home` is the implicit pseudo-space that exists without any room behind
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpaceKey {
    /// The home pseudo-space.
    Home,
    /// A real space room.
    Space(RoomId),
}

impl SpaceKey {
    /// Room id of the space. `None` for home.
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Self::Home => None,
            Self::Space(id) => Some(id),
        }
    }
}

impl fmt::Display for SpaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("home"),
            Self::Space(id) => write!(f, "{id}"),
        }
    }
}

impl From<Option<RoomId>> for SpaceKey {
    fn from(space: Option<RoomId>) -> Self {
        space.map_or(Self::Home, Self::Space)
    }
}
