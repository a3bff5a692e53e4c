//! Reference-counted room state registry.
//!
//! There is exactly one [`RoomNotificationState`] per room at any time. Every
//! list, space and tile that shows a room acquires it from the registry and
//! releases it when done; the state is created on the first acquire and
//! destroyed on the last release. Events are routed by room id, so a room
//! event touches one state rather than every registered one.

use std::collections::{BTreeSet, HashMap};

use crate::{
    ClientEvent, MatrixClient, NotificationLevel, NotificationState, NotificationUpdate,
    Propagation, RoomId, RoomNotificationState, RoomStateFactory, Settings, StateKey,
};

#[derive(Debug, Clone)]
struct Entry {
    state: RoomNotificationState,
    refs: usize,
}

/// Owner of every live room state.
#[derive(Debug)]
pub struct RoomStateRegistry<C> {
    client: C,
    states: HashMap<RoomId, Entry>,
    with_threads: bool,
    hide_bold: bool,
}

impl<C: MatrixClient> RoomStateRegistry<C> {
    /// Create an empty registry reading from `client`.
    pub fn new(client: C, settings: &Settings) -> Self {
        Self {
            client,
            states: HashMap::new(),
            with_threads: settings.feature_threads,
            hide_bold: settings.hide_bold,
        }
    }

    /// Client the states read from.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Number of live states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// No live states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// References held on a room's state. Zero if it does not exist.
    pub fn ref_count(&self, room_id: &RoomId) -> usize {
        self.states.get(room_id).map_or(0, |entry| entry.refs)
    }

    /// Rooms with a live state, sorted.
    pub fn room_ids(&self) -> BTreeSet<RoomId> {
        self.states.keys().cloned().collect()
    }

    /// Every live state, in no particular order.
    pub fn states(&self) -> impl Iterator<Item = &RoomNotificationState> {
        self.states.values().map(|entry| &entry.state)
    }

    /// Whether per-thread states are attached to new room states.
    pub fn with_threads(&self) -> bool {
        self.with_threads
    }

    /// Attach or stop attaching per-thread states to room states created
    /// from now on. Live states keep what they were created with.
    pub fn set_with_threads(&mut self, with_threads: bool) {
        self.with_threads = with_threads;
    }

    /// Route a client event to the states it concerns.
    ///
    /// Room-scoped events reach at most one state. Push rule changes reach
    /// all of them. Events for rooms nobody acquired are dropped.
    pub fn handle(&mut self, event: &ClientEvent) -> Propagation {
        let mut propagation = Propagation::default();
        let client = &self.client;

        match event {
            ClientEvent::PushRulesChanged => {
                for entry in self.states.values_mut() {
                    propagation.extend(entry.state.handle(client, event));
                }
            },
            _ => {
                if let Some(entry) = event.room_id().and_then(|id| self.states.get_mut(id)) {
                    propagation.extend(entry.state.handle(client, event));
                }
            },
        }

        if !propagation.is_empty() {
            tracing::trace!(
                updates = propagation.updates.len(),
                rooms = propagation.changed_rooms.len(),
                "registry handled event"
            );
        }
        propagation
    }

    /// Flip the `hide_bold` display flag on every state.
    ///
    /// Snapshots do not change, but renderers of activity-only states must
    /// redraw, so an update is emitted for each of them.
    pub fn set_hide_bold(&mut self, hide_bold: bool) -> Vec<NotificationUpdate> {
        if self.hide_bold == hide_bold {
            return Vec::new();
        }
        self.hide_bold = hide_bold;

        let mut updates = Vec::new();
        for (room_id, entry) in &mut self.states {
            entry.state.set_hide_bold(hide_bold);
            if let Some(threads) = entry.state.threads() {
                for thread in threads.threads().filter(|t| t.level() == NotificationLevel::Activity)
                {
                    updates.push(NotificationUpdate::new(
                        StateKey::Thread(room_id.clone(), thread.thread_id().clone()),
                        thread.snapshot(),
                    ));
                }
            }
            if entry.state.level() == NotificationLevel::Activity {
                updates.push(NotificationUpdate::new(
                    StateKey::Room(room_id.clone()),
                    entry.state.snapshot(),
                ));
            }
        }
        updates.sort_by(|a, b| a.key.cmp(&b.key));
        updates
    }

    /// Mutable client, for tests driving a client double.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Destroy every state regardless of references.
    pub fn clear(&mut self) {
        if !self.states.is_empty() {
            tracing::debug!(states = self.states.len(), "clearing room states");
        }
        self.states.clear();
    }
}

impl<C: MatrixClient> RoomStateFactory for RoomStateRegistry<C> {
    fn acquire(&mut self, room_id: &RoomId) {
        if let Some(entry) = self.states.get_mut(room_id) {
            entry.refs += 1;
            return;
        }

        let mut state = RoomNotificationState::new(room_id.clone(), self.with_threads, self.hide_bold);
        state.initialise(&self.client);
        tracing::debug!(%room_id, "created room notification state");
        self.states.insert(room_id.clone(), Entry { state, refs: 1 });
    }

    fn release(&mut self, room_id: &RoomId) {
        let Some(entry) = self.states.get_mut(room_id) else {
            tracing::warn!(%room_id, "release of unknown room state");
            return;
        };
        entry.refs = entry.refs.saturating_sub(1);
        if entry.refs == 0 {
            self.states.remove(room_id);
            tracing::debug!(%room_id, "destroyed room notification state");
        }
    }

    fn get(&self, room_id: &RoomId) -> Option<&RoomNotificationState> {
        self.states.get(room_id).map(|entry| &entry.state)
    }
}
