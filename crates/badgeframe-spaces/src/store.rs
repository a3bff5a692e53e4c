//! Space hierarchy and per-space room sets.
//!
//! The store keeps, for every space key, the set of rooms shown while that
//! space is selected:
//!
//! - A space shows its child rooms, the rooms of its child spaces
//!   (transitively), and DMs with any of its joined members.
//! - Home shows space invites, rooms without a parent space, DMs and
//!   favourites.
//!
//! Every rebuild diffs the new sets against the old ones by value and only
//! reports keys that actually changed. Each key also owns a
//! [`SpaceNotificationState`] fed with its room set.

use std::collections::{BTreeMap, BTreeSet};

use badgeframe_core::{
    ClientEvent, DirectMap, MatrixClient, Membership, NotificationLevel, NotificationState,
    NotificationUpdate, RoomId, RoomStateFactory, SettingKey, SettingWatcher, SettingsStore, SpaceKey,
    SpaceNotificationState, StateKey, TagId, diff::map_diff,
};

use crate::{SpaceAction, SpaceError};

static NO_ROOMS: BTreeSet<RoomId> = BTreeSet::new();

/// Space panel state.
#[derive(Debug)]
pub struct SpaceStore<C> {
    client: C,
    enabled: SettingWatcher,
    hide_bold: SettingWatcher,
    root_spaces: Vec<RoomId>,
    orphaned_rooms: Vec<RoomId>,
    parents: BTreeMap<RoomId, BTreeSet<RoomId>>,
    filtered: BTreeMap<SpaceKey, BTreeSet<RoomId>>,
    states: BTreeMap<SpaceKey, SpaceNotificationState>,
    active_space: Option<RoomId>,
}

impl<C: MatrixClient> SpaceStore<C> {
    /// Create an empty store. Nothing is built until [`SpaceStore::rebuild`].
    pub fn new(client: C, settings: &SettingsStore) -> Self {
        Self {
            client,
            enabled: settings.watch_setting(SettingKey::FeatureSpaces),
            hide_bold: settings.watch_setting(SettingKey::HideBold),
            root_spaces: Vec::new(),
            orphaned_rooms: Vec::new(),
            parents: BTreeMap::new(),
            filtered: BTreeMap::new(),
            states: BTreeMap::new(),
            active_space: None,
        }
    }

    /// Whether the spaces feature is on.
    pub fn is_enabled(&self) -> bool {
        self.enabled.value()
    }

    /// Client the store reads from.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Mutable client, for tests driving a client double.
    #[cfg(test)]
    pub(crate) fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Spaces shown at the top of the panel.
    pub fn root_spaces(&self) -> &[RoomId] {
        &self.root_spaces
    }

    /// Visible rooms that no joined space lists as a child.
    pub fn orphaned_rooms(&self) -> &[RoomId] {
        &self.orphaned_rooms
    }

    /// Currently selected space. `None` is home.
    pub fn active_space(&self) -> Option<&RoomId> {
        self.active_space.as_ref()
    }

    /// Rooms shown under a space key. Empty for unknown keys.
    pub fn space_filtered_room_ids(&self, key: &SpaceKey) -> &BTreeSet<RoomId> {
        self.filtered.get(key).unwrap_or(&NO_ROOMS)
    }

    /// Keys with a filtered room set.
    pub fn space_keys(&self) -> impl Iterator<Item = &SpaceKey> {
        self.filtered.keys()
    }

    /// Joined spaces listing `room_id` as a child.
    pub fn parents(&self, room_id: &RoomId) -> &BTreeSet<RoomId> {
        self.parents.get(room_id).unwrap_or(&NO_ROOMS)
    }

    /// Known non-space children of a space.
    pub fn child_rooms(&self, space_id: &RoomId) -> Vec<RoomId> {
        self.children(space_id).into_iter().filter(|id| !self.client.is_space(id)).collect()
    }

    /// Known space children of a space.
    pub fn child_spaces(&self, space_id: &RoomId) -> Vec<RoomId> {
        self.children(space_id).into_iter().filter(|id| self.client.is_space(id)).collect()
    }

    /// Badge of a space key.
    pub fn notification_state(&self, key: &SpaceKey) -> Option<&SpaceNotificationState> {
        self.states.get(key)
    }

    /// Every space badge.
    pub fn notification_states(&self) -> impl Iterator<Item = &SpaceNotificationState> {
        self.states.values()
    }

    /// Rebuild the hierarchy from scratch, then the room sets.
    pub fn rebuild<F: RoomStateFactory + ?Sized>(&mut self, factory: &mut F) -> Vec<SpaceAction> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let spaces = self.joined_spaces();
        let mut unseen: BTreeSet<RoomId> = self.client.visible_room_ids().into_iter().collect();
        unseen.extend(spaces.iter().cloned());

        let mut parents: BTreeMap<RoomId, BTreeSet<RoomId>> = BTreeMap::new();
        for space_id in &spaces {
            for child in self.children(space_id) {
                unseen.remove(&child);
                parents.entry(child).or_default().insert(space_id.clone());
            }
        }

        let mut roots: Vec<RoomId> =
            unseen.iter().filter(|id| spaces.contains(*id)).cloned().collect();
        let orphans: Vec<RoomId> =
            unseen.into_iter().filter(|id| !self.client.is_space(id)).collect();
        self.promote_cycles(&spaces, &mut roots);

        let roots_changed = roots != self.root_spaces;
        self.root_spaces = roots;
        self.parents = parents;
        self.orphaned_rooms = orphans;

        let mut actions = self.on_rooms_update(factory);
        if roots_changed {
            actions.push(SpaceAction::TopLevelSpacesChanged(self.root_spaces.clone()));
        }

        let stale = self.active_space.as_ref().is_some_and(|active| !spaces.contains(active));
        if stale {
            tracing::debug!("active space no longer joined");
            actions.extend(self.select(None));
        }

        tracing::debug!(
            spaces = spaces.len(),
            roots = self.root_spaces.len(),
            orphans = self.orphaned_rooms.len(),
            "space hierarchy rebuilt"
        );
        actions
    }

    /// Recompute every room set from the current hierarchy.
    ///
    /// Emits [`SpaceAction::SpaceRoomsChanged`] for keys whose set changed by
    /// value and feeds every set to its notification state.
    pub fn on_rooms_update<F: RoomStateFactory + ?Sized>(
        &mut self,
        factory: &mut F,
    ) -> Vec<SpaceAction> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let mut next: BTreeMap<SpaceKey, BTreeSet<RoomId>> = BTreeMap::new();

        let mut home: BTreeSet<RoomId> = self
            .client
            .room_ids()
            .into_iter()
            .filter(|id| {
                self.client.is_space(id) && self.client.membership(id) == Some(Membership::Invite)
            })
            .collect();
        home.extend(
            self.client
                .visible_room_ids()
                .into_iter()
                .filter(|id| !self.client.is_space(id) && self.show_in_home(id)),
        );
        next.insert(SpaceKey::Home, home);

        for root in &self.root_spaces {
            self.collect_space(root, &BTreeSet::new(), &mut next);
        }

        let diff = map_diff(&self.filtered, &next);
        let mut actions: Vec<SpaceAction> = diff
            .added
            .iter()
            .chain(&diff.removed)
            .chain(&diff.changed)
            .cloned()
            .map(SpaceAction::SpaceRoomsChanged)
            .collect();

        for key in &diff.removed {
            if let Some(mut state) = self.states.remove(key) {
                state.destroy(factory);
            }
        }

        self.filtered = next;
        for (key, rooms) in &self.filtered {
            let rooms: Vec<RoomId> = rooms.iter().cloned().collect();
            let hide_bold = self.hide_bold.value();
            let state = self
                .states
                .entry(key.clone())
                .or_insert_with(|| SpaceNotificationState::new(key.clone(), hide_bold));
            if let Some(snapshot) = state.set_rooms(&rooms, factory) {
                actions.push(SpaceAction::Notification(NotificationUpdate::new(
                    StateKey::Space(key.clone()),
                    snapshot,
                )));
            }
        }
        actions
    }

    /// Re-evaluate whether one room belongs in home.
    ///
    /// Favourite and DM changes can only move a room in or out of home, so
    /// this avoids a full rebuild.
    pub fn on_room_update<F: RoomStateFactory + ?Sized>(
        &mut self,
        room_id: &RoomId,
        factory: &mut F,
    ) -> Vec<SpaceAction> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let show = self.show_in_home(room_id);
        let home = self.filtered.entry(SpaceKey::Home).or_default();
        let changed = if show { home.insert(room_id.clone()) } else { home.remove(room_id) };
        if !changed {
            return Vec::new();
        }
        tracing::debug!(%room_id, show, "home membership changed");

        let rooms: Vec<RoomId> = home.iter().cloned().collect();
        let mut actions = vec![SpaceAction::SpaceRoomsChanged(SpaceKey::Home)];
        let hide_bold = self.hide_bold.value();
        let state = self
            .states
            .entry(SpaceKey::Home)
            .or_insert_with(|| SpaceNotificationState::new(SpaceKey::Home, hide_bold));
        if let Some(snapshot) = state.set_rooms(&rooms, factory) {
            actions.push(SpaceAction::Notification(NotificationUpdate::new(
                StateKey::Space(SpaceKey::Home),
                snapshot,
            )));
        }
        actions
    }

    /// React to a client event affecting the hierarchy.
    pub fn handle<F: RoomStateFactory + ?Sized>(
        &mut self,
        event: &ClientEvent,
        factory: &mut F,
    ) -> Vec<SpaceAction> {
        if !self.is_enabled() {
            return Vec::new();
        }

        match event {
            ClientEvent::RoomAdded { room_id } | ClientEvent::MyMembership { room_id } => {
                if self.client.is_space(room_id) {
                    self.rebuild_for_space(room_id, factory)
                } else if self.listed_by_joined_space(room_id) {
                    self.rebuild(factory)
                } else {
                    self.on_rooms_update(factory)
                }
            },
            ClientEvent::SpaceChildChanged { space_id } => {
                if self.client.is_space(space_id) {
                    self.rebuild_for_space(space_id, factory)
                } else {
                    Vec::new()
                }
            },
            ClientEvent::SpaceParentChanged { room_id } => {
                if self.client.is_space(room_id) {
                    self.rebuild_for_space(room_id, factory)
                } else {
                    self.on_room_update(room_id, factory)
                }
            },
            ClientEvent::RoomTagsChanged { room_id, .. } => {
                if self.client.is_space(room_id) || !event.favourite_toggled() {
                    return Vec::new();
                }
                self.on_room_update(room_id, factory)
            },
            ClientEvent::DirectChanged { previous, current } => {
                let mut actions = Vec::new();
                for room_id in direct_rooms_changed(previous, current) {
                    if self.client.membership(&room_id).is_none() {
                        continue;
                    }
                    for action in self.on_room_update(&room_id, factory) {
                        if !actions.contains(&action) {
                            actions.push(action);
                        }
                    }
                }
                actions
            },
            _ => Vec::new(),
        }
    }

    /// Recompute the badges of spaces containing a changed room.
    pub fn refresh_aggregates<F: RoomStateFactory + ?Sized>(
        &mut self,
        changed_rooms: &BTreeSet<RoomId>,
        factory: &F,
    ) -> Vec<SpaceAction> {
        let mut actions = Vec::new();
        for (key, state) in &mut self.states {
            if !changed_rooms.iter().any(|room_id| state.tracks(room_id)) {
                continue;
            }
            if let Some(snapshot) = state.recompute(factory) {
                actions.push(SpaceAction::Notification(NotificationUpdate::new(
                    StateKey::Space(key.clone()),
                    snapshot,
                )));
            }
        }
        actions
    }

    /// Select a space, or home with `None`.
    pub fn set_active_space(&mut self, space: Option<RoomId>) -> Result<Vec<SpaceAction>, SpaceError> {
        if !self.is_enabled() {
            return Err(SpaceError::Disabled);
        }
        if let Some(space_id) = &space {
            if !self.is_joined_space(space_id) {
                return Err(SpaceError::NotASpace { room_id: space_id.clone() });
            }
        }
        Ok(self.select(space))
    }

    /// Restore the selection persisted by a previous session.
    ///
    /// Only root spaces are restored; anything else leaves home selected.
    pub fn restore_active_space(&mut self, space: Option<RoomId>) -> Vec<SpaceAction> {
        match space {
            Some(space_id) if self.root_spaces.contains(&space_id) => {
                self.set_active_space(Some(space_id)).unwrap_or_default()
            },
            Some(space_id) => {
                tracing::debug!(%space_id, "persisted space is not a root, ignoring");
                Vec::new()
            },
            None => Vec::new(),
        }
    }

    /// Follow the user to a room.
    ///
    /// Viewing a joined space selects it. Viewing a joined room that the
    /// active space does not show selects the room's first parent space.
    pub fn view_room(&mut self, room_id: &RoomId) -> Vec<SpaceAction> {
        if !self.is_enabled() || self.client.membership(room_id) != Some(Membership::Join) {
            return Vec::new();
        }
        if self.client.is_space(room_id) {
            return self.select(Some(room_id.clone()));
        }

        let active = SpaceKey::from(self.active_space.clone());
        if self.space_filtered_room_ids(&active).contains(room_id) {
            return Vec::new();
        }
        match self.parents(room_id).first().cloned() {
            Some(parent) => self.select(Some(parent)),
            None => Vec::new(),
        }
    }

    /// Ask the host to add `room_id` to `space_id`.
    pub fn add_room_to_space(
        &self,
        space_id: &RoomId,
        room_id: &RoomId,
        via: Vec<String>,
    ) -> Result<SpaceAction, SpaceError> {
        if !self.is_enabled() {
            return Err(SpaceError::Disabled);
        }
        if !self.is_joined_space(space_id) {
            return Err(SpaceError::NotASpace { room_id: space_id.clone() });
        }
        Ok(SpaceAction::SendSpaceChild {
            space_id: space_id.clone(),
            room_id: room_id.clone(),
            via,
        })
    }

    /// Apply a pending `hide_bold` change to every space badge.
    ///
    /// Activity-only badges render differently afterwards, so each of them is
    /// re-emitted.
    pub fn poll_settings(&mut self) -> Vec<SpaceAction> {
        let Some(hide_bold) = self.hide_bold.poll_changed() else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        for (key, state) in &mut self.states {
            state.set_hide_bold(hide_bold);
            if state.level() == NotificationLevel::Activity {
                actions.push(SpaceAction::Notification(NotificationUpdate::new(
                    StateKey::Space(key.clone()),
                    state.snapshot(),
                )));
            }
        }
        actions
    }

    /// Forget everything and release every room state, for logout.
    pub fn reset<F: RoomStateFactory + ?Sized>(&mut self, factory: &mut F) {
        for state in self.states.values_mut() {
            state.destroy(factory);
        }
        self.states.clear();
        self.filtered.clear();
        self.parents.clear();
        self.root_spaces.clear();
        self.orphaned_rooms.clear();
        self.active_space = None;
    }

    /// Rebuild after a change to one space, always reporting that space.
    fn rebuild_for_space<F: RoomStateFactory + ?Sized>(
        &mut self,
        space_id: &RoomId,
        factory: &mut F,
    ) -> Vec<SpaceAction> {
        let mut actions = self.rebuild(factory);
        let touched = SpaceAction::SpaceRoomsChanged(SpaceKey::Space(space_id.clone()));
        if !actions.contains(&touched) {
            actions.push(touched);
        }
        actions
    }

    fn select(&mut self, space: Option<RoomId>) -> Vec<SpaceAction> {
        if space == self.active_space {
            return Vec::new();
        }
        tracing::debug!(space = %SpaceKey::from(space.clone()), "selected space changed");
        self.active_space = space.clone();
        vec![SpaceAction::SelectedSpaceChanged(space.clone()), SpaceAction::PersistActiveSpace(space)]
    }

    fn joined_spaces(&self) -> BTreeSet<RoomId> {
        self.client
            .room_ids()
            .into_iter()
            .filter(|id| self.is_joined_space(id))
            .collect()
    }

    fn is_joined_space(&self, room_id: &RoomId) -> bool {
        self.client.is_space(room_id) && self.client.membership(room_id) == Some(Membership::Join)
    }

    /// Children the client knows about and the user has not left, in event
    /// order.
    fn children(&self, space_id: &RoomId) -> Vec<RoomId> {
        self.client
            .space_children(space_id)
            .into_iter()
            .filter(|id| {
                self.client
                    .membership(id)
                    .is_some_and(|m| !matches!(m, Membership::Leave | Membership::Ban))
            })
            .collect()
    }

    /// Whether any joined space has an `m.space.child` event for the room,
    /// whatever the room's membership.
    fn listed_by_joined_space(&self, room_id: &RoomId) -> bool {
        self.joined_spaces()
            .iter()
            .any(|space_id| self.client.space_children(space_id).contains(room_id))
    }

    fn show_in_home(&self, room_id: &RoomId) -> bool {
        self.parents.get(room_id).is_none_or(BTreeSet::is_empty)
            || self.client.dm_user_for_room(room_id).is_some()
            || self.client.tags(room_id).iter().any(TagId::is_favourite)
    }

    /// Spaces that are children of other spaces but unreachable from any
    /// root only exist inside a cycle. The lowest id of each such group
    /// becomes a root.
    fn promote_cycles(&self, spaces: &BTreeSet<RoomId>, roots: &mut Vec<RoomId>) {
        let mut reached: BTreeSet<RoomId> = BTreeSet::new();
        let mut stack: Vec<RoomId> = roots.clone();
        loop {
            while let Some(space_id) = stack.pop() {
                if !reached.insert(space_id.clone()) {
                    continue;
                }
                stack.extend(self.children(&space_id).into_iter().filter(|id| spaces.contains(id)));
            }
            match spaces.iter().find(|id| !reached.contains(*id)) {
                Some(space_id) => {
                    tracing::debug!(%space_id, "promoting space in parent cycle to root");
                    roots.push(space_id.clone());
                    stack.push(space_id.clone());
                },
                None => break,
            }
        }
    }

    /// Collect the rooms of `space_id` and its descendants into `out`.
    ///
    /// `path` holds the spaces above this one; a space already on the path
    /// contributes nothing.
    fn collect_space(
        &self,
        space_id: &RoomId,
        path: &BTreeSet<RoomId>,
        out: &mut BTreeMap<SpaceKey, BTreeSet<RoomId>>,
    ) -> BTreeSet<RoomId> {
        if path.contains(space_id) {
            return BTreeSet::new();
        }

        let (child_spaces, child_rooms): (Vec<RoomId>, Vec<RoomId>) =
            self.children(space_id).into_iter().partition(|id| self.client.is_space(id));
        let mut rooms: BTreeSet<RoomId> = child_rooms.into_iter().collect();

        for member in self.client.joined_members(space_id) {
            rooms.extend(self.client.dm_rooms_for_user(&member));
        }

        let mut below = path.clone();
        below.insert(space_id.clone());
        for child in &child_spaces {
            rooms.extend(self.collect_space(child, &below, out));
        }

        out.insert(SpaceKey::Space(space_id.clone()), rooms.clone());
        rooms
    }
}

/// Rooms whose DM-ness may have changed between two `m.direct` contents.
///
/// Users are compared by value; a user whose room list is a permutation of
/// the old one changed nothing.
fn direct_rooms_changed(previous: &DirectMap, current: &DirectMap) -> BTreeSet<RoomId> {
    let as_sets = |map: &DirectMap| -> BTreeMap<_, BTreeSet<RoomId>> {
        map.iter().map(|(user, rooms)| (user.clone(), rooms.iter().cloned().collect())).collect()
    };
    let previous = as_sets(previous);
    let current = as_sets(current);

    let mut rooms = BTreeSet::new();
    for user in map_diff(&previous, &current).into_keys() {
        for map in [&previous, &current] {
            if let Some(set) = map.get(&user) {
                rooms.extend(set.iter().cloned());
            }
        }
    }
    rooms
}

#[cfg(test)]
mod tests {
    use badgeframe_core::{RoomStateRegistry, Settings, UserId, testing::FakeClient};

    use super::*;

    fn id(raw: &str) -> RoomId {
        RoomId::from(raw)
    }

    fn space(client: &mut FakeClient, space_id: &str, children: &[&str]) {
        let data = client.room_mut(&id(space_id));
        data.is_space = true;
        data.children = children.iter().map(|c| id(c)).collect();
    }

    struct Fixture {
        settings: SettingsStore,
        spaces: SpaceStore<FakeClient>,
        registry: RoomStateRegistry<FakeClient>,
    }

    impl Fixture {
        fn new(client: FakeClient) -> Self {
            let settings = SettingsStore::default();
            let spaces = SpaceStore::new(client.clone(), &settings);
            let registry = RoomStateRegistry::new(client, &Settings::default());
            Self { settings, spaces, registry }
        }

        fn rebuild(&mut self) -> Vec<SpaceAction> {
            self.spaces.rebuild(&mut self.registry)
        }

        fn rooms(&self, key: &SpaceKey) -> Vec<&str> {
            self.spaces.space_filtered_room_ids(key).iter().map(RoomId::as_str).collect()
        }
    }

    fn nested_client() -> FakeClient {
        let mut client = FakeClient::default();
        space(&mut client, "!outer", &["!inner", "!r1"]);
        space(&mut client, "!inner", &["!r2"]);
        client.room_mut(&id("!r1"));
        client.room_mut(&id("!r2"));
        client.room_mut(&id("!loose"));
        client
    }

    #[test]
    fn rebuild_finds_roots_parents_and_orphans() {
        let mut fixture = Fixture::new(nested_client());
        let actions = fixture.rebuild();

        assert_eq!(fixture.spaces.root_spaces(), [id("!outer")].as_slice());
        assert_eq!(fixture.spaces.orphaned_rooms(), [id("!loose")].as_slice());
        assert_eq!(fixture.spaces.parents(&id("!r2")), &BTreeSet::from([id("!inner")]));
        assert!(actions.contains(&SpaceAction::TopLevelSpacesChanged(vec![id("!outer")])));
    }

    #[test]
    fn space_sets_are_transitive() {
        let mut fixture = Fixture::new(nested_client());
        fixture.rebuild();

        assert_eq!(fixture.rooms(&SpaceKey::Space(id("!outer"))), ["!r1", "!r2"]);
        assert_eq!(fixture.rooms(&SpaceKey::Space(id("!inner"))), ["!r2"]);
        assert_eq!(fixture.rooms(&SpaceKey::Home), ["!loose"]);
    }

    #[test]
    fn cycles_terminate_and_do_not_double_count() {
        let mut client = FakeClient::default();
        space(&mut client, "!a", &["!b", "!shared"]);
        space(&mut client, "!b", &["!a", "!shared"]);
        client.room_mut(&id("!shared")).total = Some(2);

        let mut fixture = Fixture::new(client);
        fixture.rebuild();

        assert_eq!(fixture.spaces.root_spaces(), [id("!a")].as_slice());
        assert_eq!(fixture.rooms(&SpaceKey::Space(id("!a"))), ["!shared"]);
        let badge = fixture.spaces.notification_state(&SpaceKey::Space(id("!a")));
        assert_eq!(badge.map(|s| s.count()), Some(2));
    }

    #[test]
    fn second_rebuild_reports_nothing() {
        let mut fixture = Fixture::new(nested_client());
        fixture.rebuild();
        assert!(fixture.rebuild().is_empty());
    }

    #[test]
    fn only_changed_spaces_are_reported() {
        let mut fixture = Fixture::new(nested_client());
        fixture.rebuild();

        fixture.spaces.client_mut().room_mut(&id("!r3"));
        fixture.spaces.client_mut().room_mut(&id("!inner")).children.push(id("!r3"));
        let actions = fixture.spaces.handle(
            &ClientEvent::SpaceChildChanged { space_id: id("!inner") },
            &mut fixture.registry,
        );

        let changed: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                SpaceAction::SpaceRoomsChanged(key) => Some(key.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(changed, vec![SpaceKey::Space(id("!inner")), SpaceKey::Space(id("!outer"))]);
    }

    #[test]
    fn dms_with_space_members_show_in_space_and_home() {
        let mut client = nested_client();
        let friend = UserId::from("@friend:example.org");
        client.room_mut(&id("!outer")).members.push(friend.clone());
        client.room_mut(&id("!dm")).dm_user = Some(friend);

        let mut fixture = Fixture::new(client);
        fixture.rebuild();

        assert!(fixture.spaces.space_filtered_room_ids(&SpaceKey::Space(id("!outer"))).contains(&id("!dm")));
        assert!(fixture.spaces.space_filtered_room_ids(&SpaceKey::Home).contains(&id("!dm")));
    }

    #[test]
    fn favourite_toggle_moves_room_into_home() {
        let mut fixture = Fixture::new(nested_client());
        fixture.rebuild();
        assert!(!fixture.spaces.space_filtered_room_ids(&SpaceKey::Home).contains(&id("!r1")));

        fixture.spaces.client_mut().room_mut(&id("!r1")).tags.push(TagId::from(TagId::FAVOURITE));
        let actions = fixture.spaces.handle(
            &ClientEvent::RoomTagsChanged {
                room_id: id("!r1"),
                previous: BTreeSet::new(),
                current: BTreeSet::from([TagId::from(TagId::FAVOURITE)]),
            },
            &mut fixture.registry,
        );

        assert_eq!(actions.first(), Some(&SpaceAction::SpaceRoomsChanged(SpaceKey::Home)));
        assert!(fixture.spaces.space_filtered_room_ids(&SpaceKey::Home).contains(&id("!r1")));
        assert!(fixture.spaces.notification_state(&SpaceKey::Home).is_some_and(|s| s.tracks(&id("!r1"))));
    }

    #[test]
    fn direct_changes_are_diffed_by_value() {
        let alice = UserId::from("@alice:example.org");
        let bob = UserId::from("@bob:example.org");
        let previous = DirectMap::from([
            (alice.clone(), vec![id("!a1"), id("!a2")]),
            (bob.clone(), vec![id("!b1")]),
        ]);
        let current = DirectMap::from([
            (alice, vec![id("!a2"), id("!a1")]),
            (bob, vec![id("!b2")]),
        ]);

        assert_eq!(direct_rooms_changed(&previous, &current), BTreeSet::from([id("!b1"), id("!b2")]));
    }

    #[test]
    fn invited_spaces_show_in_home() {
        let mut client = nested_client();
        space(&mut client, "!invited", &[]);
        client.room_mut(&id("!invited")).membership = Some(Membership::Invite);

        let mut fixture = Fixture::new(client);
        fixture.rebuild();

        assert!(fixture.spaces.space_filtered_room_ids(&SpaceKey::Home).contains(&id("!invited")));
        assert!(!fixture.spaces.root_spaces().contains(&id("!invited")));
    }

    #[test]
    fn view_room_switches_to_parent_space() {
        let mut fixture = Fixture::new(nested_client());
        fixture.rebuild();

        let actions = fixture.spaces.view_room(&id("!r2"));
        assert_eq!(
            actions,
            vec![
                SpaceAction::SelectedSpaceChanged(Some(id("!inner"))),
                SpaceAction::PersistActiveSpace(Some(id("!inner"))),
            ]
        );
        assert!(fixture.spaces.view_room(&id("!r2")).is_empty());
    }

    #[test]
    fn selection_is_validated() {
        let mut fixture = Fixture::new(nested_client());
        fixture.rebuild();

        assert_eq!(
            fixture.spaces.set_active_space(Some(id("!r1"))),
            Err(SpaceError::NotASpace { room_id: id("!r1") })
        );
        assert!(fixture.spaces.restore_active_space(Some(id("!inner"))).is_empty());
        assert_eq!(fixture.spaces.restore_active_space(Some(id("!outer"))).len(), 2);
        assert_eq!(fixture.spaces.active_space(), Some(&id("!outer")));
    }

    #[test]
    fn add_room_to_space_requests_state_event() {
        let mut fixture = Fixture::new(nested_client());
        fixture.rebuild();

        let action = fixture.spaces.add_room_to_space(&id("!outer"), &id("!loose"), vec!["example.org".into()]);
        assert_eq!(
            action,
            Ok(SpaceAction::SendSpaceChild {
                space_id: id("!outer"),
                room_id: id("!loose"),
                via: vec!["example.org".into()],
            })
        );
    }

    #[test]
    fn disabled_store_does_nothing() {
        let mut fixture = Fixture::new(nested_client());
        fixture.settings.set_value(SettingKey::FeatureSpaces, false);

        assert!(fixture.rebuild().is_empty());
        assert!(fixture.spaces.root_spaces().is_empty());
        assert_eq!(fixture.spaces.set_active_space(None), Err(SpaceError::Disabled));
    }

    #[test]
    fn removed_space_releases_its_badge() {
        let mut fixture = Fixture::new(nested_client());
        fixture.rebuild();
        assert!(fixture.spaces.notification_state(&SpaceKey::Space(id("!inner"))).is_some());

        fixture.spaces.client_mut().room_mut(&id("!inner")).membership = Some(Membership::Leave);
        fixture.spaces.client_mut().room_mut(&id("!outer")).children.retain(|c| c != &id("!inner"));
        fixture.rebuild();

        assert!(fixture.spaces.notification_state(&SpaceKey::Space(id("!inner"))).is_none());
    }

    #[test]
    fn left_children_drop_out_of_their_space() {
        let mut fixture = Fixture::new(nested_client());
        fixture.rebuild();
        assert!(fixture.rooms(&SpaceKey::Space(id("!outer"))).contains(&"!r1"));

        fixture.spaces.client_mut().room_mut(&id("!r1")).membership = Some(Membership::Leave);
        fixture.rebuild();

        assert!(!fixture.rooms(&SpaceKey::Space(id("!outer"))).contains(&"!r1"));
        assert!(fixture.spaces.parents(&id("!r1")).is_empty());

        fixture.spaces.client_mut().room_mut(&id("!r2")).membership = Some(Membership::Ban);
        fixture.rebuild();
        assert!(fixture.rooms(&SpaceKey::Space(id("!inner"))).is_empty());
    }

    #[test]
    fn hide_bold_reemits_activity_badges() {
        let mut client = nested_client();
        client.room_mut(&id("!r1")).has_unread = true;
        let mut fixture = Fixture::new(client);
        fixture.rebuild();

        assert!(fixture.spaces.poll_settings().is_empty());
        fixture.settings.set_value(SettingKey::HideBold, true);
        let actions = fixture.spaces.poll_settings();

        assert_eq!(actions.len(), 1);
        let outer = fixture.spaces.notification_state(&SpaceKey::Space(id("!outer")));
        assert!(outer.is_some_and(|s| !s.is_unread()));
    }

    #[test]
    fn space_badge_follows_room_changes() {
        let mut fixture = Fixture::new(nested_client());
        fixture.rebuild();

        fixture.registry.client_mut().room_mut(&id("!r2")).highlight = Some(1);
        let propagation = fixture
            .registry
            .handle(&ClientEvent::Timeline { room_id: id("!r2"), thread_id: None });
        let actions = fixture.spaces.refresh_aggregates(&propagation.changed_rooms, &fixture.registry);

        assert_eq!(actions.len(), 2);
        let outer = fixture.spaces.notification_state(&SpaceKey::Space(id("!outer")));
        assert_eq!(outer.map(|s| s.level()), Some(NotificationLevel::Highlight));
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        const SPACES: [&str; 4] = ["!s0", "!s1", "!s2", "!s3"];
        const ROOMS: [&str; 4] = ["!r0", "!r1", "!r2", "!r3"];

        fn graph() -> impl Strategy<Value = Vec<Vec<usize>>> {
            prop::collection::vec(prop::collection::vec(0usize..8, 0..5), 4)
        }

        fn client_for(edges: &[Vec<usize>]) -> FakeClient {
            let mut client = FakeClient::default();
            for room in ROOMS {
                client.room_mut(&id(room)).total = Some(1);
            }
            for (space_id, targets) in SPACES.iter().zip(edges) {
                let children: Vec<&str> = targets
                    .iter()
                    .map(|t| if *t < 4 { SPACES[*t] } else { ROOMS[*t - 4] })
                    .collect();
                space(&mut client, space_id, &children);
            }
            client
        }

        proptest! {
            #[test]
            fn arbitrary_graphs_terminate_and_cover_every_room(edges in graph()) {
                let mut fixture = Fixture::new(client_for(&edges));
                fixture.rebuild();

                for room in ROOMS {
                    let shown = fixture
                        .spaces
                        .space_keys()
                        .any(|key| fixture.spaces.space_filtered_room_ids(key).contains(&id(room)));
                    prop_assert!(shown, "{room} is not shown anywhere");
                }
                for space_id in SPACES {
                    let key = SpaceKey::Space(id(space_id));
                    let rooms = fixture.spaces.space_filtered_room_ids(&key).len() as u64;
                    let badge = fixture.spaces.notification_state(&key).map_or(0, |s| s.count());
                    prop_assert_eq!(badge, rooms);
                }
                prop_assert!(fixture.rebuild().is_empty());
            }
        }
    }
}
