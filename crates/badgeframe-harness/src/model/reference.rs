//! Room badges computed from raw world data.

use badgeframe_core::{
    Membership, NotificationLevel, NotificationSnapshot, RoomId, SYMBOL_ALERT,
    testing::{FakeClient, FakeRoom},
};

/// Badge a room should show, given the world as it is now.
///
/// Unknown rooms are idle. With `with_threads`, the heaviest thread level
/// lifts the room level but never its count.
pub fn expected_room_badge(world: &FakeClient, room_id: &RoomId, with_threads: bool) -> NotificationSnapshot {
    let Some(room) = world.rooms.get(room_id) else {
        return NotificationSnapshot::default();
    };

    let mut snapshot = NotificationSnapshot {
        muted: room.muted,
        knocked: room.membership == Some(Membership::Knock),
        ..NotificationSnapshot::default()
    };

    if room.unsent {
        snapshot.symbol = Some(SYMBOL_ALERT);
        snapshot.count = 1;
        snapshot.level = NotificationLevel::Unsent;
    } else if room.muted {
        // Idle regardless of counts.
    } else if room.membership == Some(Membership::Invite) {
        snapshot.symbol = Some(SYMBOL_ALERT);
        snapshot.count = 1;
        snapshot.level = NotificationLevel::Highlight;
    } else {
        let (count, level) = counted(room.highlight, room.total, room.has_unread);
        snapshot.count = count;
        snapshot.level = if with_threads { level.max(thread_level(room)) } else { level };
    }
    snapshot
}

fn thread_level(room: &FakeRoom) -> NotificationLevel {
    room.threads
        .values()
        .map(|thread| counted(thread.highlight, thread.total, thread.has_unread).1)
        .max()
        .unwrap_or_default()
}

fn counted(highlight: Option<u64>, total: Option<u64>, has_unread: bool) -> (u64, NotificationLevel) {
    let red = highlight.unwrap_or(0);
    let grey = total.unwrap_or(0);
    match (red, grey) {
        (0, 0) if has_unread => (0, NotificationLevel::Activity),
        (0, 0) => (0, NotificationLevel::None),
        (0, grey) => (grey, NotificationLevel::Notification),
        (red, 0) => (red, NotificationLevel::Highlight),
        (_, grey) => (grey, NotificationLevel::Highlight),
    }
}
