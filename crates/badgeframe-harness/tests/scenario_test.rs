//! End-to-end notification scenario.
//!
//! A small account with one work space, a loose room and a DM goes through a
//! morning of traffic. The final badges are pinned as a snapshot.

use std::collections::BTreeMap;

use badgeframe_app::{App, AppAction, AppEvent};
use badgeframe_core::{
    ClientEvent, Membership, NotificationLevel, NotificationState, RoomId, SYMBOL_ALERT, Settings,
    SpaceKey, StateKey, TagId, UserId,
};
use badgeframe_harness::{InvariantRegistry, SimClient, SystemSnapshot};
use badgeframe_spaces::SpaceAction;

fn id(raw: &str) -> RoomId {
    RoomId::from(raw)
}

/// Feed a client event and check invariants.
fn deliver(app: &mut App<SimClient>, event: ClientEvent) -> Vec<AppAction> {
    let actions = app.handle(AppEvent::Client(event));
    InvariantRegistry::standard().assert_all(&SystemSnapshot::from_app(app), "after delivery");
    actions
}

/// Every badge as `"<count> <level>"`, keyed by what it belongs to.
fn badges(snapshot: &SystemSnapshot) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (room_id, room) in &snapshot.rooms {
        out.insert(format!("room {room_id}"), format!("{} {}", room.badge.count, room.badge.level));
    }
    for agg in &snapshot.aggregates {
        let name = match &agg.key {
            StateKey::List(tag) => format!("list {tag}"),
            StateKey::Space(key) => format!("space {key}"),
            other => format!("{other:?}"),
        };
        out.insert(name, format!("{} {}", agg.badge.count, agg.badge.level));
    }
    let summary = &snapshot.summary.badge;
    out.insert("summary".to_owned(), format!("{} {}", summary.count, summary.level));
    out
}

fn work_account() -> SimClient {
    let client = SimClient::new();
    client.add_space(&id("!work:sim"));
    for room in ["!standup:sim", "!design:sim", "!friends:sim", "!bob:sim"] {
        client.add_room(&id(room), Membership::Join);
    }
    client.link(&id("!work:sim"), &id("!standup:sim"));
    client.link(&id("!work:sim"), &id("!design:sim"));
    client.set_direct(&id("!bob:sim"), Some(UserId::from("@bob:sim")));
    client
}

#[test]
fn morning_traffic() {
    let client = work_account();
    let mut app = App::new(client.clone(), Settings::default());

    let actions = app.handle(AppEvent::Ready { last_space: Some(id("!work:sim")) });
    assert!(actions.contains(&AppAction::Space(SpaceAction::TopLevelSpacesChanged(vec![id(
        "!work:sim"
    )]))));
    assert_eq!(
        app.spaces().space_filtered_room_ids(&SpaceKey::Home).iter().collect::<Vec<_>>(),
        vec![&id("!bob:sim"), &id("!friends:sim")]
    );

    app.handle(AppEvent::SetListRooms {
        tag: TagId::from(TagId::UNTAGGED),
        rooms: vec![id("!standup:sim"), id("!design:sim"), id("!friends:sim")],
    });
    app.handle(AppEvent::SetListRooms { tag: TagId::from(TagId::DM), rooms: vec![id("!bob:sim")] });

    deliver(&mut app, client.receive(&id("!standup:sim"), None, true));
    deliver(&mut app, client.receive(&id("!design:sim"), None, false));
    deliver(&mut app, client.receive(&id("!design:sim"), None, false));
    deliver(&mut app, client.receive_quiet(&id("!friends:sim")));
    deliver(&mut app, client.receive(&id("!bob:sim"), None, false));
    let actions = deliver(&mut app, client.set_unsent(&id("!design:sim"), true));

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
            StateKey::Room(id("!design:sim")),
            StateKey::List(TagId::from(TagId::UNTAGGED)),
            StateKey::Summary,
            StateKey::Space(SpaceKey::Space(id("!work:sim"))),
        ]
    );

    insta::assert_json_snapshot!(badges(&SystemSnapshot::from_app(&app)), @r#"
    {
      "list im.vector.fake.direct": "1 notification",
      "list im.vector.fake.recent": "2 unsent",
      "room !bob:sim": "1 notification",
      "room !design:sim": "1 unsent",
      "room !friends:sim": "0 activity",
      "room !standup:sim": "1 highlight",
      "space !work:sim": "2 unsent",
      "space home": "1 notification",
      "summary": "3 unsent"
    }
    "#);
}

#[test]
fn reading_clears_badges_everywhere() {
    let client = work_account();
    let mut app = App::new(client.clone(), Settings::default());
    app.handle(AppEvent::Ready { last_space: None });
    app.handle(AppEvent::SetListRooms {
        tag: TagId::from(TagId::UNTAGGED),
        rooms: vec![id("!standup:sim")],
    });

    deliver(&mut app, client.receive(&id("!standup:sim"), None, true));
    deliver(&mut app, client.read(&id("!standup:sim"), None));

    let snapshot = SystemSnapshot::from_app(&app);
    assert_eq!(snapshot.summary.badge.count, 0);
    let work = app.spaces().notification_state(&SpaceKey::Space(id("!work:sim")));
    assert!(work.is_some_and(NotificationState::is_idle));
}

#[test]
fn leaving_the_space_moves_rooms_home() {
    let client = work_account();
    let mut app = App::new(client.clone(), Settings::default());
    app.handle(AppEvent::Ready { last_space: Some(id("!work:sim")) });

    let actions = deliver(&mut app, client.set_membership(&id("!work:sim"), Membership::Leave));

    assert!(actions.contains(&AppAction::Space(SpaceAction::TopLevelSpacesChanged(vec![]))));
    assert!(actions.contains(&AppAction::Space(SpaceAction::SelectedSpaceChanged(None))));
    assert_eq!(app.spaces().active_space(), None);
    assert!(app.spaces().space_filtered_room_ids(&SpaceKey::Home).contains(&id("!standup:sim")));
}

#[test]
fn room_badge_lifecycle() {
    let client = SimClient::new();
    let room = id("!lifecycle:sim");
    client.add_room(&room, Membership::Join);
    let mut app = App::new(client.clone(), Settings::default());
    app.handle(AppEvent::Ready { last_space: None });
    app.handle(AppEvent::SetListRooms { tag: TagId::from(TagId::UNTAGGED), rooms: vec![room.clone()] });

    let badge = |app: &App<SimClient>| {
        let state = app.notifications().room_state(&room);
        state.map(|state| (state.symbol(), state.count(), state.level()))
    };

    for _ in 0..3 {
        deliver(&mut app, client.receive(&room, None, false));
    }
    assert_eq!(badge(&app), Some((None, 3, NotificationLevel::Notification)));

    client.with_world(|world| world.room_mut(&room).highlight = Some(1));
    deliver(&mut app, ClientEvent::UnreadNotifications { room_id: room.clone(), thread_id: None });
    assert_eq!(badge(&app), Some((None, 3, NotificationLevel::Highlight)));

    deliver(&mut app, client.set_muted(&room, true));
    assert_eq!(badge(&app), Some((None, 0, NotificationLevel::None)));

    deliver(&mut app, client.set_muted(&room, false));
    deliver(&mut app, client.set_unsent(&room, true));
    assert_eq!(badge(&app), Some((Some(SYMBOL_ALERT), 1, NotificationLevel::Unsent)));
}

#[test]
fn room_joined_after_its_space_lists_it_stays_out_of_home() {
    let client = work_account();
    let mut app = App::new(client.clone(), Settings::default());
    app.handle(AppEvent::Ready { last_space: None });

    client.link(&id("!work:sim"), &id("!planning:sim"));
    deliver(&mut app, ClientEvent::SpaceChildChanged { space_id: id("!work:sim") });
    deliver(&mut app, client.add_room(&id("!planning:sim"), Membership::Join));

    let work = SpaceKey::Space(id("!work:sim"));
    let spaces = app.spaces();
    assert!(spaces.parents(&id("!planning:sim")).contains(&id("!work:sim")));
    assert!(spaces.space_filtered_room_ids(&work).contains(&id("!planning:sim")));
    assert!(!spaces.space_filtered_room_ids(&SpaceKey::Home).contains(&id("!planning:sim")));

    deliver(&mut app, client.set_membership(&id("!planning:sim"), Membership::Leave));
    let spaces = app.spaces();
    assert!(spaces.parents(&id("!planning:sim")).is_empty());
    assert!(!spaces.space_filtered_room_ids(&work).contains(&id("!planning:sim")));
    assert!(!spaces.space_filtered_room_ids(&SpaceKey::Home).contains(&id("!planning:sim")));
}
