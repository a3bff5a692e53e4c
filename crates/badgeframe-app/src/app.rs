//! Application state machine.
//!
//! This module defines the [`App`] state machine, which wires the
//! [`NotificationStore`] and the [`SpaceStore`] to one event stream.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] outputs for the runtime to publish.
//!
//! # Propagation order
//!
//! A client event is applied in a fixed sequence, so no aggregate ever reads
//! a room that has not finished recomputing:
//!
//! 1. Room and thread states.
//! 2. List aggregates and the global summary.
//! 3. Space structure (hierarchy, filtered room sets).
//! 4. Space aggregates tracking a room changed in step 1.

use badgeframe_core::{
    ClientEvent, MatrixClient, NotificationStore, RoomId, SettingKey, SettingWatcher, Settings,
    SettingsStore,
};
use badgeframe_spaces::SpaceStore;

use crate::{AppAction, AppEvent};

/// Application state machine.
///
/// Owns both stores and the settings they watch. No I/O dependencies.
#[derive(Debug)]
pub struct App<C> {
    settings: SettingsStore,
    notifications: NotificationStore<C>,
    spaces: SpaceStore<C>,
    spaces_flag: SettingWatcher,
    ready: bool,
}

impl<C: MatrixClient + Clone> App<C> {
    /// Create an app reading from `client`. Nothing is tracked until
    /// [`AppEvent::Ready`].
    pub fn new(client: C, settings: Settings) -> Self {
        let settings = SettingsStore::new(settings);
        let notifications = NotificationStore::new(client.clone(), &settings);
        let spaces = SpaceStore::new(client, &settings);
        let spaces_flag = settings.watch_setting(SettingKey::FeatureSpaces);
        Self { settings, notifications, spaces, spaces_flag, ready: false }
    }

    /// Settings store. Follow a change with [`AppEvent::SettingsChanged`].
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Room, list and summary states.
    pub fn notifications(&self) -> &NotificationStore<C> {
        &self.notifications
    }

    /// Space panel state.
    pub fn spaces(&self) -> &SpaceStore<C> {
        &self.spaces
    }

    /// Whether the client is ready.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Ready { last_space } => self.on_ready(last_space),
            AppEvent::NotReady => {
                self.on_not_ready();
                vec![]
            },
            AppEvent::Client(event) => self.on_client_event(&event),
            AppEvent::SetListRooms { tag, rooms } => {
                if !self.ready {
                    tracing::debug!(%tag, "list rooms set before ready, ignoring");
                    return vec![];
                }
                into_actions(self.notifications.set_list_rooms(&tag, &rooms))
            },
            AppEvent::RemoveList { tag } => into_actions(self.notifications.remove_list(&tag)),
            AppEvent::ViewRoom { room_id } => into_actions(self.spaces.view_room(&room_id)),
            AppEvent::SetActiveSpace { space } => match self.spaces.set_active_space(space) {
                Ok(actions) => into_actions(actions),
                Err(err) => {
                    tracing::warn!(%err, "space selection rejected");
                    vec![]
                },
            },
            AppEvent::SettingsChanged => self.on_settings_changed(),
        }
    }

    fn on_ready(&mut self, last_space: Option<RoomId>) -> Vec<AppAction> {
        if self.ready {
            return vec![];
        }
        self.ready = true;
        tracing::info!("client ready");

        let mut actions = into_actions(self.spaces.rebuild(self.notifications.registry_mut()));
        actions.extend(into_actions(self.spaces.restore_active_space(last_space)));
        actions
    }

    fn on_not_ready(&mut self) {
        if !self.ready {
            return;
        }
        self.ready = false;
        self.spaces.reset(self.notifications.registry_mut());
        self.notifications.reset();
        tracing::info!("client not ready, notification state cleared");
    }

    fn on_client_event(&mut self, event: &ClientEvent) -> Vec<AppAction> {
        if !self.ready {
            tracing::trace!(?event, "client event before ready, ignoring");
            return vec![];
        }

        let propagation = self.notifications.handle(event);
        let mut actions = into_actions(propagation.updates);

        actions.extend(into_actions(self.spaces.handle(event, self.notifications.registry_mut())));

        if !propagation.changed_rooms.is_empty() {
            let refreshed = self
                .spaces
                .refresh_aggregates(&propagation.changed_rooms, self.notifications.registry());
            actions.extend(into_actions(refreshed));
        }
        actions
    }

    fn on_settings_changed(&mut self) -> Vec<AppAction> {
        let mut actions = into_actions(self.notifications.poll_settings());
        actions.extend(into_actions(self.spaces.poll_settings()));

        if let Some(enabled) = self.spaces_flag.poll_changed() {
            tracing::info!(enabled, "spaces toggled");
            if !enabled {
                self.spaces.reset(self.notifications.registry_mut());
            } else if self.ready {
                actions.extend(into_actions(self.spaces.rebuild(self.notifications.registry_mut())));
            }
        }
        actions
    }
}

fn into_actions<T: Into<AppAction>>(items: Vec<T>) -> Vec<AppAction> {
    items.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use badgeframe_core::{
        NotificationState, NotificationUpdate, SpaceKey, StateKey, TagId, testing::FakeClient,
    };
    use badgeframe_spaces::SpaceAction;

    use super::*;

    fn id(raw: &str) -> RoomId {
        RoomId::from(raw)
    }

    #[test]
    fn events_before_ready_are_ignored() {
        let mut app = App::new(FakeClient::default(), Settings::default());
        let actions = app.handle(AppEvent::Client(ClientEvent::PushRulesChanged));
        assert!(actions.is_empty());
        assert!(app.handle(AppEvent::SetListRooms { tag: TagId::from("u.x"), rooms: vec![id("!a")] }).is_empty());
        assert!(app.notifications().registry().is_empty());
        assert!(app.notifications().summary().is_idle());
    }

    #[test]
    fn ready_builds_spaces_and_restores_selection() {
        let mut client = FakeClient::default();
        let space = client.room_mut(&id("!space"));
        space.is_space = true;
        space.children = vec![id("!room")];
        client.room_mut(&id("!room"));

        let mut app = App::new(client, Settings::default());
        let actions = app.handle(AppEvent::Ready { last_space: Some(id("!space")) });

        assert!(actions.contains(&AppAction::Space(SpaceAction::TopLevelSpacesChanged(vec![id("!space")]))));
        assert!(actions.contains(&AppAction::Space(SpaceAction::SelectedSpaceChanged(Some(id("!space"))))));
        assert_eq!(app.spaces().active_space(), Some(&id("!space")));
    }

    #[test]
    fn not_ready_releases_every_state() {
        let mut client = FakeClient::default();
        let space = client.room_mut(&id("!space"));
        space.is_space = true;
        space.children = vec![id("!room")];
        client.room_mut(&id("!room"));

        let mut app = App::new(client, Settings::default());
        app.handle(AppEvent::Ready { last_space: None });
        app.handle(AppEvent::SetListRooms { tag: TagId::from(TagId::UNTAGGED), rooms: vec![id("!room")] });
        assert!(!app.notifications().registry().is_empty());

        app.handle(AppEvent::NotReady);
        assert!(app.notifications().registry().is_empty());
        assert!(app.spaces().notification_state(&SpaceKey::Home).is_none());
    }

    #[test]
    fn disabling_spaces_resets_the_panel() {
        let mut client = FakeClient::default();
        client.room_mut(&id("!space")).is_space = true;

        let mut app = App::new(client, Settings::default());
        app.handle(AppEvent::Ready { last_space: None });
        assert_eq!(app.spaces().root_spaces(), [id("!space")].as_slice());

        app.settings().set_value(SettingKey::FeatureSpaces, false);
        app.handle(AppEvent::SettingsChanged);
        assert!(app.spaces().root_spaces().is_empty());

        app.settings().set_value(SettingKey::FeatureSpaces, true);
        let actions = app.handle(AppEvent::SettingsChanged);
        assert!(actions.contains(&AppAction::Space(SpaceAction::TopLevelSpacesChanged(vec![id("!space")]))));
    }

    #[test]
    fn disabling_threads_affects_rooms_listed_afterwards() {
        let mut app = App::new(FakeClient::default(), Settings::default());
        app.handle(AppEvent::Ready { last_space: None });

        app.settings().set_value(SettingKey::FeatureThreads, false);
        app.handle(AppEvent::SettingsChanged);
        app.handle(AppEvent::SetListRooms { tag: TagId::from(TagId::UNTAGGED), rooms: vec![id("!a")] });

        let state = app.notifications().room_state(&id("!a"));
        assert_eq!(state.map(|s| s.threads().is_some()), Some(false));
    }

    #[test]
    fn rejected_space_selection_emits_nothing() {
        let mut app = App::new(FakeClient::default(), Settings::default());
        app.handle(AppEvent::Ready { last_space: None });
        assert!(app.handle(AppEvent::SetActiveSpace { space: Some(id("!nope")) }).is_empty());
    }

    #[test]
    fn space_notifications_are_flattened() {
        let update =
            NotificationUpdate::new(StateKey::Space(SpaceKey::Home), Default::default());
        let action = AppAction::from(SpaceAction::Notification(update.clone()));
        assert_eq!(action, AppAction::Notification(update));
    }

    #[test]
    fn room_changes_reach_lists_and_spaces() {
        let mut client = FakeClient::default();
        let space = client.room_mut(&id("!space"));
        space.is_space = true;
        space.children = vec![id("!room")];
        client.room_mut(&id("!room"));

        let mut app = App::new(client, Settings::default());
        app.handle(AppEvent::Ready { last_space: None });
        app.handle(AppEvent::SetListRooms {
            tag: TagId::from(TagId::UNTAGGED),
            rooms: vec![id("!room")],
        });

        let room = app.notifications.registry_mut().client_mut().room_mut(&id("!room"));
        room.total = Some(2);
        let actions = app.handle(AppEvent::Client(ClientEvent::Timeline {
            room_id: id("!room"),
            thread_id: None,
        }));

        let keys: Vec<_> = actions
            .iter()
            .filter_map(|action| match action {
                AppAction::Notification(update) => Some(update.key.clone()),
                AppAction::Space(_) => None,
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                StateKey::Room(id("!room")),
                StateKey::List(TagId::from(TagId::UNTAGGED)),
                StateKey::Summary,
                StateKey::Space(SpaceKey::Space(id("!space"))),
            ]
        );
    }
}
