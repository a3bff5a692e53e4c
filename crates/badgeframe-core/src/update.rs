//! Update notifications emitted to badge renderers.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{NotificationSnapshot, RoomId, SpaceKey, TagId, ThreadId};

/// Identifies which notification state an update is for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StateKey {
    /// A room badge.
    Room(RoomId),
    /// A single thread badge.
    Thread(RoomId, ThreadId),
    /// The roll-up of all threads in a room.
    Threads(RoomId),
    /// A room list section.
    List(TagId),
    /// A space panel button.
    Space(SpaceKey),
    /// The roll-up of every room.
    Summary,
}

/// A notification state's snapshot changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationUpdate {
    /// State that changed.
    pub key: StateKey,
    /// Snapshot after the change.
    pub snapshot: NotificationSnapshot,
}

impl NotificationUpdate {
    /// Create an update.
    pub fn new(key: StateKey, snapshot: NotificationSnapshot) -> Self {
        Self { key, snapshot }
    }

    /// Room the update concerns, for room and thread keys.
    pub fn room_id(&self) -> Option<&RoomId> {
        match &self.key {
            StateKey::Room(id) | StateKey::Thread(id, _) | StateKey::Threads(id) => Some(id),
            StateKey::List(_) | StateKey::Space(_) | StateKey::Summary => None,
        }
    }
}

/// Everything one event changed.
///
/// `changed_rooms` holds rooms whose own badge changed; aggregates only need
/// to look at those.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Updates in emission order: threads, rooms, then aggregates.
    pub updates: Vec<NotificationUpdate>,
    /// Rooms whose room-level snapshot changed.
    pub changed_rooms: BTreeSet<RoomId>,
}

impl Propagation {
    /// Nothing changed.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Record an update, noting the room if it is a room-level change.
    pub fn push(&mut self, update: NotificationUpdate) {
        if let StateKey::Room(room_id) = &update.key {
            self.changed_rooms.insert(room_id.clone());
        }
        self.updates.push(update);
    }

    /// Append another propagation.
    pub fn append(&mut self, other: Propagation) {
        self.updates.extend(other.updates);
        self.changed_rooms.extend(other.changed_rooms);
    }
}

impl Extend<NotificationUpdate> for Propagation {
    fn extend<T: IntoIterator<Item = NotificationUpdate>>(&mut self, iter: T) {
        for update in iter {
            self.push(update);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_updates_mark_the_room_changed() {
        let mut propagation = Propagation::default();
        let room = RoomId::from("!a");
        propagation.push(NotificationUpdate::new(
            StateKey::Threads(room.clone()),
            NotificationSnapshot::default(),
        ));
        assert!(propagation.changed_rooms.is_empty());

        propagation.push(NotificationUpdate::new(
            StateKey::Room(room.clone()),
            NotificationSnapshot::default(),
        ));
        assert!(propagation.changed_rooms.contains(&room));
        assert_eq!(propagation.updates.len(), 2);
    }
}
