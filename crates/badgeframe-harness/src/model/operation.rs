//! Operations for model-based testing.
//!
//! Operations represent every action the simulation knows how to take. They
//! are generated randomly by proptest or the fuzzer, then applied to the
//! simulated world and the app.

use arbitrary::Arbitrary;
use badgeframe_app::{App, AppEvent};
use badgeframe_core::{Membership, RoomId, SettingKey, TagId, ThreadId, UserId};

use crate::SimClient;

/// Room identifier (uses u8 to keep test space manageable).
pub type ModelRoomId = u8;

const ROOMS: u8 = 6;
const SPACES: u8 = 3;
const THREADS: u8 = 2;
const USERS: u8 = 2;

/// Map a model id to a room id.
pub fn room_id(id: ModelRoomId) -> RoomId {
    RoomId::new(format!("!room{}:sim", id % ROOMS))
}

/// Map a model id to a space id.
pub fn space_id(id: ModelRoomId) -> RoomId {
    RoomId::new(format!("!space{}:sim", id % SPACES))
}

/// Map a model id to a thread root.
pub fn thread_id(id: u8) -> ThreadId {
    ThreadId::new(format!("$thread{}", id % THREADS))
}

/// Map a model id to a DM counterpart.
pub fn user_id(id: u8) -> UserId {
    UserId::new(format!("@user{}:sim", id % USERS))
}

/// Room list section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Section {
    /// Pending invites. Counted by tile.
    Invites,
    /// Favourites.
    Favourites,
    /// Everything untagged.
    Untagged,
    /// Low priority rooms.
    LowPriority,
}

impl Section {
    /// Tag of the section.
    pub fn tag(self) -> TagId {
        TagId::from(match self {
            Self::Invites => TagId::INVITE,
            Self::Favourites => TagId::FAVOURITE,
            Self::Untagged => TagId::UNTAGGED,
            Self::LowPriority => TagId::LOW_PRIORITY,
        })
    }
}

/// Target of a space child link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Child {
    /// A plain room.
    Room(ModelRoomId),
    /// A subspace.
    Space(ModelRoomId),
}

impl Child {
    /// Room id of the child.
    pub fn room_id(self) -> RoomId {
        match self {
            Self::Room(id) => room_id(id),
            Self::Space(id) => space_id(id),
        }
    }
}

/// Operations that can be applied to the system.
///
/// Operations are designed to be small and composable so proptest can
/// explore interesting combinations.
#[derive(Debug, Clone, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Server sends a new room.
    AddRoom {
        /// Room added.
        room: ModelRoomId,
        /// Arrives as an invite instead of joined.
        invite: bool,
    },

    /// Server sends a new joined space.
    AddSpace {
        /// Space added.
        space: ModelRoomId,
    },

    /// User joins a room (accepting an invite if any).
    Join {
        /// Room joined.
        room: ModelRoomId,
    },

    /// User leaves a room.
    Leave {
        /// Room left.
        room: ModelRoomId,
    },

    /// User leaves a space.
    LeaveSpace {
        /// Space left.
        space: ModelRoomId,
    },

    /// A space gains a child.
    Link {
        /// Parent space.
        space: ModelRoomId,
        /// New child.
        child: Child,
    },

    /// A space loses a child.
    Unlink {
        /// Parent space.
        space: ModelRoomId,
        /// Removed child.
        child: Child,
    },

    /// A notifying message arrives.
    Receive {
        /// Target room.
        room: ModelRoomId,
        /// Thread, or the main timeline.
        thread: Option<u8>,
        /// Message mentions the user.
        highlight: bool,
    },

    /// A message arrives that push rules do not notify for.
    ReceiveQuiet {
        /// Target room.
        room: ModelRoomId,
    },

    /// User reads a timeline.
    Read {
        /// Target room.
        room: ModelRoomId,
        /// Thread, or the main timeline.
        thread: Option<u8>,
    },

    /// Push rules change for a room.
    Mute {
        /// Target room.
        room: ModelRoomId,
        /// Muted afterwards.
        muted: bool,
    },

    /// A local echo fails or is resent.
    Unsent {
        /// Target room.
        room: ModelRoomId,
        /// Has unsent events afterwards.
        unsent: bool,
    },

    /// Favourite tag toggled.
    Favourite {
        /// Target room.
        room: ModelRoomId,
        /// Favourite afterwards.
        on: bool,
    },

    /// `m.direct` entry changed.
    Direct {
        /// Target room.
        room: ModelRoomId,
        /// DM counterpart afterwards, if any.
        user: Option<u8>,
    },

    /// The room list lays out a section.
    Layout {
        /// Section laid out.
        section: Section,
        /// Rooms shown, in order.
        rooms: Vec<ModelRoomId>,
    },

    /// The room list hides a section.
    RemoveLayout {
        /// Section hidden.
        section: Section,
    },

    /// User picks a space, or home.
    SelectSpace {
        /// Space picked.
        space: Option<ModelRoomId>,
    },

    /// User opens a room.
    ViewRoom {
        /// Room opened.
        room: ModelRoomId,
    },

    /// Flip the `hide_bold` setting.
    ToggleHideBold,

    /// Flip the spaces feature.
    ToggleSpaces,

    /// Session lost and restored.
    Reconnect,
}

impl Operation {
    /// Mutate the world and return the events the host would deliver.
    ///
    /// Settings toggles are written into `app`'s settings store directly.
    pub fn apply(&self, client: &SimClient, app: &App<SimClient>) -> Vec<AppEvent> {
        let client_event = match self {
            Self::AddRoom { room, invite } => {
                let membership = if *invite { Membership::Invite } else { Membership::Join };
                client.add_room(&room_id(*room), membership)
            },
            Self::AddSpace { space } => client.add_space(&space_id(*space)),
            Self::Join { room } => client.set_membership(&room_id(*room), Membership::Join),
            Self::Leave { room } => client.set_membership(&room_id(*room), Membership::Leave),
            Self::LeaveSpace { space } => {
                client.set_membership(&space_id(*space), Membership::Leave)
            },
            Self::Link { space, child } => client.link(&space_id(*space), &child.room_id()),
            Self::Unlink { space, child } => client.unlink(&space_id(*space), &child.room_id()),
            Self::Receive { room, thread, highlight } => {
                let thread = thread.map(thread_id);
                client.receive(&room_id(*room), thread.as_ref(), *highlight)
            },
            Self::ReceiveQuiet { room } => client.receive_quiet(&room_id(*room)),
            Self::Read { room, thread } => {
                let thread = thread.map(thread_id);
                client.read(&room_id(*room), thread.as_ref())
            },
            Self::Mute { room, muted } => client.set_muted(&room_id(*room), *muted),
            Self::Unsent { room, unsent } => client.set_unsent(&room_id(*room), *unsent),
            Self::Favourite { room, on } => client.set_favourite(&room_id(*room), *on),
            Self::Direct { room, user } => client.set_direct(&room_id(*room), user.map(user_id)),
            Self::Layout { section, rooms } => {
                let rooms = rooms.iter().map(|id| room_id(*id)).collect();
                return vec![AppEvent::SetListRooms { tag: section.tag(), rooms }];
            },
            Self::RemoveLayout { section } => {
                return vec![AppEvent::RemoveList { tag: section.tag() }];
            },
            Self::SelectSpace { space } => {
                return vec![AppEvent::SetActiveSpace { space: space.map(space_id) }];
            },
            Self::ViewRoom { room } => return vec![AppEvent::ViewRoom { room_id: room_id(*room) }],
            Self::ToggleHideBold => return toggle(app, SettingKey::HideBold),
            Self::ToggleSpaces => return toggle(app, SettingKey::FeatureSpaces),
            Self::Reconnect => {
                let last_space = app.spaces().active_space().cloned();
                return vec![AppEvent::NotReady, AppEvent::Ready { last_space }];
            },
        };
        vec![AppEvent::Client(client_event)]
    }
}

fn toggle(app: &App<SimClient>, key: SettingKey) -> Vec<AppEvent> {
    let settings = app.settings();
    settings.set_value(key, !settings.get_value(key));
    vec![AppEvent::SettingsChanged]
}
