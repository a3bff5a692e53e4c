//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the app at a point in time.
//! Invariants operate on snapshots rather than live state so every check sees
//! the same, fully propagated view.

use std::collections::BTreeMap;

use badgeframe_app::App;
use badgeframe_core::{
    MatrixClient, NotificationSnapshot, NotificationState, RoomId, StateKey,
};
use serde::Serialize;

use crate::{SimClient, model::expected_room_badge};

/// Snapshot of the whole notification system.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemSnapshot {
    /// Every room state held by the registry.
    pub rooms: BTreeMap<RoomId, RoomSnapshot>,
    /// List and space aggregates.
    pub aggregates: Vec<AggregateSnapshot>,
    /// Global roll-up.
    pub summary: SummarySnapshot,
}

impl SystemSnapshot {
    /// Create an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the app's current state.
    ///
    /// Each room also records the badge the reference model derives from the
    /// raw world data, for comparison.
    pub fn from_app(app: &App<SimClient>) -> Self {
        let notifications = app.notifications();
        let registry = notifications.registry();
        let client = notifications.client();
        let world = client.world();

        let rooms = registry
            .states()
            .map(|state| {
                let room_id = state.room_id().clone();
                let snapshot = RoomSnapshot {
                    badge: state.snapshot(),
                    expected: expected_room_badge(&world, &room_id, registry.with_threads()),
                    unsent: client.has_unsent_events(&room_id),
                    muted: client.is_muted(&room_id),
                    refs: registry.ref_count(&room_id),
                };
                (room_id, snapshot)
            })
            .collect();

        let mut aggregates = Vec::new();
        for tag in notifications.list_tags() {
            if let Ok(list) = notifications.get_list_state(tag) {
                aggregates.push(AggregateSnapshot {
                    key: StateKey::List(tag.clone()),
                    by_tile_count: list.by_tile_count(),
                    rooms: list.rooms().to_vec(),
                    badge: list.snapshot(),
                });
            }
        }
        for state in app.spaces().notification_states() {
            aggregates.push(AggregateSnapshot {
                key: StateKey::Space(state.key().clone()),
                by_tile_count: false,
                rooms: state.rooms().to_vec(),
                badge: state.snapshot(),
            });
        }

        let summary = SummarySnapshot {
            badge: notifications.summary().snapshot(),
            num_unread_states: notifications.summary().num_unread_states(),
        };

        Self { rooms, aggregates, summary }
    }

    /// Aggregates backing a room list section.
    pub fn lists(&self) -> impl Iterator<Item = &AggregateSnapshot> {
        self.aggregates.iter().filter(|agg| matches!(agg.key, StateKey::List(_)))
    }
}

/// Snapshot of one room state.
#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshot {
    /// Badge the store computed.
    pub badge: NotificationSnapshot,
    /// Badge the reference model computes from the world.
    pub expected: NotificationSnapshot,
    /// Client reports unsent local echoes.
    pub unsent: bool,
    /// Client reports the room muted.
    pub muted: bool,
    /// Registry reference count.
    pub refs: usize,
}

/// Snapshot of a list or space aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateSnapshot {
    /// Which aggregate.
    pub key: StateKey,
    /// Counts rooms instead of summing badges.
    pub by_tile_count: bool,
    /// Tracked rooms.
    pub rooms: Vec<RoomId>,
    /// Aggregate badge.
    pub badge: NotificationSnapshot,
}

/// Snapshot of the global roll-up.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SummarySnapshot {
    /// Summary badge.
    pub badge: NotificationSnapshot,
    /// Rooms with a numeric badge.
    pub num_unread_states: usize,
}

#[cfg(test)]
mod tests {
    use badgeframe_app::AppEvent;
    use badgeframe_core::{Membership, Settings, TagId};

    use super::*;

    #[test]
    fn snapshot_of_idle_app_is_empty() {
        let app = App::new(SimClient::new(), Settings::default());
        let snapshot = SystemSnapshot::from_app(&app);
        assert!(snapshot.rooms.is_empty());
        assert!(snapshot.aggregates.is_empty());
        assert_eq!(snapshot.summary.num_unread_states, 0);
    }

    #[test]
    fn snapshot_lists_rooms_and_aggregates() {
        let client = SimClient::new();
        let room = RoomId::from("!a:sim");
        client.add_room(&room, Membership::Join);

        let mut app = App::new(client, Settings::default());
        app.handle(AppEvent::Ready { last_space: None });
        app.handle(AppEvent::SetListRooms {
            tag: TagId::from(TagId::UNTAGGED),
            rooms: vec![room.clone()],
        });

        let snapshot = SystemSnapshot::from_app(&app);
        assert_eq!(snapshot.rooms[&room].refs, 2);
        assert_eq!(snapshot.lists().count(), 1);
        assert_eq!(snapshot.aggregates.len(), 2);
    }
}
