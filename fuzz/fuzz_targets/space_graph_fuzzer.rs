//! Fuzz target for space hierarchy construction
//!
//! # Strategy
//!
//! - Arbitrary child edges between a handful of spaces and rooms, including
//!   self-loops, cycles and dangling targets
//! - Random memberships so some spaces are invited or left
//!
//! # Invariants
//!
//! - Every joined space is a root or has a joined parent
//! - Roots are joined spaces and never repeat
//! - A second rebuild on an unchanged world reports nothing
//! - NEVER panic or loop forever on cyclic graphs

#![no_main]

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use badgeframe_core::{
    MatrixClient, Membership, RoomId, RoomStateRegistry, Settings, SettingsStore,
    testing::FakeClient,
};
use badgeframe_spaces::{SpaceAction, SpaceStore};
use libfuzzer_sys::fuzz_target;

const NODES: u8 = 8;

#[derive(Debug, Arbitrary)]
struct Graph {
    /// Bit `n` set: node `n` is a space.
    spaces: u8,
    /// Bit `n` set: node `n` is an invite rather than joined.
    invites: u8,
    /// Child edges as (parent, child).
    edges: Vec<(u8, u8)>,
}

fn node(n: u8) -> RoomId {
    RoomId::new(format!("!n{}:fuzz", n % NODES))
}

fn world(graph: &Graph) -> FakeClient {
    let mut client = FakeClient::default();
    for n in 0..NODES {
        let room = client.room_mut(&node(n));
        room.is_space = graph.spaces & (1 << n) != 0;
        if graph.invites & (1 << n) != 0 {
            room.membership = Some(Membership::Invite);
        }
    }
    for &(parent, child) in graph.edges.iter().take(64) {
        client.room_mut(&node(parent)).children.push(node(child));
    }
    client
}

fuzz_target!(|graph: Graph| {
    let client = world(&graph);
    let settings = SettingsStore::default();
    let mut registry = RoomStateRegistry::new(client.clone(), &Settings::default());
    let mut spaces = SpaceStore::new(client.clone(), &settings);

    spaces.rebuild(&mut registry);

    let roots = spaces.root_spaces();
    let unique: BTreeSet<&RoomId> = roots.iter().collect();
    assert_eq!(unique.len(), roots.len(), "duplicate roots {roots:?}");

    for room_id in client.room_ids() {
        let joined_space =
            client.is_space(&room_id) && client.membership(&room_id) == Some(Membership::Join);
        if roots.contains(&room_id) {
            assert!(joined_space, "root {room_id} is not a joined space");
        } else if joined_space {
            assert!(!spaces.parents(&room_id).is_empty(), "joined space {room_id} is unreachable");
        }
    }

    let again = spaces.rebuild(&mut registry);
    assert!(
        !again.iter().any(|action| matches!(
            action,
            SpaceAction::TopLevelSpacesChanged(_) | SpaceAction::SpaceRoomsChanged(_)
        )),
        "rebuild not idempotent: {again:?}"
    );
});
