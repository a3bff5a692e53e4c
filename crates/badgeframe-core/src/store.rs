//! Notification store.
//!
//! Entry point for room list badges. The store owns the room state
//! registry, one list state per room list section and the global summary.
//! Client events propagate in two phases:
//!
//! 1. The registry recomputes the affected room and thread states.
//! 2. Lists tracking a room whose badge changed recompute, then the summary.
//!
//! Aggregates therefore never observe a half-updated room.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    ClientEvent, ListNotificationState, MatrixClient, NotificationError, NotificationLevel,
    NotificationState, NotificationUpdate, Propagation, RoomId, RoomNotificationState,
    RoomStateFactory, RoomStateRegistry, SettingKey, SettingWatcher, SettingsStore, StateKey,
    SummarizedNotificationState, TagId,
};

/// Owner of room, list and summary states.
#[derive(Debug)]
pub struct NotificationStore<C> {
    registry: RoomStateRegistry<C>,
    lists: BTreeMap<TagId, ListNotificationState>,
    summary: SummarizedNotificationState,
    hide_bold: SettingWatcher,
    threads: SettingWatcher,
}

impl<C: MatrixClient> NotificationStore<C> {
    /// Create an empty store.
    pub fn new(client: C, settings: &SettingsStore) -> Self {
        Self {
            registry: RoomStateRegistry::new(client, &settings.settings()),
            lists: BTreeMap::new(),
            summary: SummarizedNotificationState::new(settings.get_value(SettingKey::HideBold)),
            hide_bold: settings.watch_setting(SettingKey::HideBold),
            threads: settings.watch_setting(SettingKey::FeatureThreads),
        }
    }

    /// Client the states read from.
    pub fn client(&self) -> &C {
        self.registry.client()
    }

    /// Room state registry.
    pub fn registry(&self) -> &RoomStateRegistry<C> {
        &self.registry
    }

    /// Mutable registry, for aggregates owned elsewhere (spaces).
    pub fn registry_mut(&mut self) -> &mut RoomStateRegistry<C> {
        &mut self.registry
    }

    /// Global summary.
    pub fn summary(&self) -> &SummarizedNotificationState {
        &self.summary
    }

    /// State of a room, if something holds it.
    pub fn room_state(&self, room_id: &RoomId) -> Option<&RoomNotificationState> {
        self.registry.get(room_id)
    }

    /// Take a reference on a room's state, for a tile rendered outside any
    /// list. Pair with [`NotificationStore::release_room`].
    pub fn acquire_room(&mut self, room_id: &RoomId) -> Option<&RoomNotificationState> {
        self.registry.acquire(room_id);
        self.registry.get(room_id)
    }

    /// Drop a reference taken with [`NotificationStore::acquire_room`].
    pub fn release_room(&mut self, room_id: &RoomId) {
        self.registry.release(room_id);
    }

    /// State of a list section, creating an empty one if needed.
    pub fn list_state(&mut self, tag: &TagId) -> &ListNotificationState {
        let hide_bold = self.hide_bold.value();
        self.lists
            .entry(tag.clone())
            .or_insert_with(|| ListNotificationState::for_tag(tag.clone(), hide_bold))
    }

    /// State of an existing list section.
    pub fn get_list_state(&self, tag: &TagId) -> Result<&ListNotificationState, NotificationError> {
        self.lists.get(tag).ok_or_else(|| NotificationError::UnknownList { tag: tag.clone() })
    }

    /// Tags with a list state.
    pub fn list_tags(&self) -> impl Iterator<Item = &TagId> {
        self.lists.keys()
    }

    /// Replace the rooms of a list section.
    ///
    /// Rooms the section already had keep their state. The summary is
    /// recomputed since the set of listed rooms may have changed.
    pub fn set_list_rooms(&mut self, tag: &TagId, rooms: &[RoomId]) -> Vec<NotificationUpdate> {
        let hide_bold = self.hide_bold.value();
        let list = self
            .lists
            .entry(tag.clone())
            .or_insert_with(|| ListNotificationState::for_tag(tag.clone(), hide_bold));

        let mut updates = Vec::new();
        if let Some(snapshot) = list.set_rooms(rooms, &mut self.registry) {
            updates.push(NotificationUpdate::new(StateKey::List(tag.clone()), snapshot));
        }
        self.push_summary(&mut updates);
        updates
    }

    /// Drop a list section and release its rooms.
    pub fn remove_list(&mut self, tag: &TagId) -> Vec<NotificationUpdate> {
        let mut updates = Vec::new();
        if let Some(mut list) = self.lists.remove(tag) {
            list.destroy(&mut self.registry);
            self.push_summary(&mut updates);
        }
        updates
    }

    /// Propagate a client event through rooms, lists and the summary.
    pub fn handle(&mut self, event: &ClientEvent) -> Propagation {
        let mut propagation = self.registry.handle(event);
        if propagation.changed_rooms.is_empty() {
            return propagation;
        }

        let mut aggregate_updates = Vec::new();
        self.refresh_lists(&propagation.changed_rooms, &mut aggregate_updates);
        self.push_summary(&mut aggregate_updates);
        propagation.extend(aggregate_updates);
        propagation
    }

    /// Apply pending setting changes, if any.
    ///
    /// A `feature_threads` change applies to room states created afterwards.
    /// A `hide_bold` change returns an update for every state whose unread
    /// rendering flipped.
    pub fn poll_settings(&mut self) -> Vec<NotificationUpdate> {
        if let Some(with_threads) = self.threads.poll_changed() {
            tracing::debug!(with_threads, "applying thread setting");
            self.registry.set_with_threads(with_threads);
        }

        let Some(hide_bold) = self.hide_bold.poll_changed() else {
            return Vec::new();
        };
        tracing::debug!(hide_bold, "applying display setting");

        let mut updates = self.registry.set_hide_bold(hide_bold);
        for (tag, list) in &mut self.lists {
            list.set_hide_bold(hide_bold);
            if list.level() == NotificationLevel::Activity {
                updates.push(NotificationUpdate::new(StateKey::List(tag.clone()), list.snapshot()));
            }
        }
        self.summary.set_hide_bold(hide_bold);
        if self.summary.level() == NotificationLevel::Activity {
            updates.push(NotificationUpdate::new(StateKey::Summary, self.summary.snapshot()));
        }
        updates
    }

    /// Destroy every state, for logout.
    pub fn reset(&mut self) {
        for list in self.lists.values_mut() {
            list.destroy(&mut self.registry);
        }
        self.lists.clear();
        self.registry.clear();
        self.summary.clear();
        tracing::debug!("notification store reset");
    }

    fn refresh_lists(&mut self, changed: &BTreeSet<RoomId>, updates: &mut Vec<NotificationUpdate>) {
        for (tag, list) in &mut self.lists {
            if !changed.iter().any(|room_id| list.tracks(room_id)) {
                continue;
            }
            if let Some(snapshot) = list.recompute(&self.registry) {
                updates.push(NotificationUpdate::new(StateKey::List(tag.clone()), snapshot));
            }
        }
    }

    fn push_summary(&mut self, updates: &mut Vec<NotificationUpdate>) {
        let listed: BTreeSet<&RoomId> =
            self.lists.values().flat_map(|list| list.rooms().iter()).collect();
        let registry = &self.registry;
        let states = listed.into_iter().filter_map(|room_id| registry.get(room_id));
        if let Some(snapshot) = self.summary.recompute(states) {
            updates.push(NotificationUpdate::new(StateKey::Summary, snapshot));
        }
    }
}
