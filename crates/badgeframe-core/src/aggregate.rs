//! Roll-up of a set of room states.
//!
//! [`AggregateState`] is the shared engine behind list and space badges.
//! It never owns room states: children are obtained from a
//! [`RoomStateFactory`] with `acquire` and handed back with `release`, so a
//! room shown in several lists has exactly one state and it is destroyed as
//! soon as the last aggregate lets go of it.

use std::collections::BTreeSet;

use crate::{
    NotificationError, NotificationLevel, NotificationSnapshot, NotificationState,
    RoomNotificationState, RoomId, StateCore, diff::set_diff,
};

/// Source of shared room states.
pub trait RoomStateFactory {
    /// Create the room's state if needed and take a reference to it.
    fn acquire(&mut self, room_id: &RoomId);

    /// Drop a reference. The state is destroyed with its last reference.
    fn release(&mut self, room_id: &RoomId);

    /// Current state of an acquired room.
    fn get(&self, room_id: &RoomId) -> Option<&RoomNotificationState>;
}

/// Shared aggregation engine for list and space badges.
///
/// Invariant: `tracked` is exactly the set of room ids most recently passed
/// to [`AggregateState::set_rooms`], and each of them holds one factory
/// reference.
#[derive(Debug, Clone)]
pub struct AggregateState {
    by_tile_count: bool,
    rooms: Vec<RoomId>,
    tracked: BTreeSet<RoomId>,
    core: StateCore,
}

impl AggregateState {
    /// Create an empty aggregate.
    ///
    /// With `by_tile_count`, the badge counts rooms instead of summing their
    /// counts.
    pub fn new(by_tile_count: bool, hide_bold: bool) -> Self {
        Self {
            by_tile_count,
            rooms: Vec::new(),
            tracked: BTreeSet::new(),
            core: StateCore::new(hide_bold),
        }
    }

    /// Whether the badge counts rooms rather than notifications.
    pub fn by_tile_count(&self) -> bool {
        self.by_tile_count
    }

    /// Rooms in the order last passed to `set_rooms`, without duplicates.
    pub fn rooms(&self) -> &[RoomId] {
        &self.rooms
    }

    /// Whether a room is tracked.
    pub fn tracks(&self, room_id: &RoomId) -> bool {
        self.tracked.contains(room_id)
    }

    /// Tracked room ids.
    pub fn tracked(&self) -> &BTreeSet<RoomId> {
        &self.tracked
    }

    /// Replace the tracked rooms.
    ///
    /// Only the difference against the previous set touches the factory:
    /// removed rooms are released, added rooms acquired, and rooms present
    /// in both are left alone. Returns the new snapshot if it changed.
    pub fn set_rooms<F: RoomStateFactory + ?Sized>(
        &mut self,
        rooms: &[RoomId],
        factory: &mut F,
    ) -> Option<NotificationSnapshot> {
        let mut seen = BTreeSet::new();
        let ordered: Vec<RoomId> = rooms.iter().filter(|id| seen.insert(*id)).cloned().collect();
        let next: BTreeSet<RoomId> = ordered.iter().cloned().collect();

        let diff = set_diff(&self.tracked, &next);
        for room_id in &diff.removed {
            factory.release(room_id);
        }
        for room_id in &diff.added {
            factory.acquire(room_id);
        }
        if !diff.is_empty() {
            tracing::debug!(
                added = diff.added.len(),
                removed = diff.removed.len(),
                "aggregate membership changed"
            );
        }

        self.rooms = ordered;
        self.tracked = next;
        self.recompute(factory)
    }

    /// Recompute from current child values. Returns the new snapshot if it
    /// changed.
    pub fn recompute<F: RoomStateFactory + ?Sized>(
        &mut self,
        factory: &F,
    ) -> Option<NotificationSnapshot> {
        let prior = self.core.snapshot();

        if self.by_tile_count {
            self.core.count = self.tracked.len() as u64;
            self.core.level = if self.tracked.is_empty() {
                NotificationLevel::None
            } else {
                NotificationLevel::Highlight
            };
        } else {
            let mut count = 0u64;
            let mut level = NotificationLevel::None;
            for state in self.tracked.iter().filter_map(|id| factory.get(id)) {
                count = count.saturating_add(state.count());
                level = level.max_of(state.level());
            }
            self.core.count = count;
            self.core.level = level;
        }
        // Aggregates never show a symbol.
        self.core.symbol = None;

        self.core.emit_if_updated(prior)
    }

    /// Child state of a tracked room.
    pub fn get_for_room<'f, F: RoomStateFactory + ?Sized>(
        &self,
        room_id: &RoomId,
        factory: &'f F,
    ) -> Result<&'f RoomNotificationState, NotificationError> {
        if !self.tracked.contains(room_id) {
            return Err(NotificationError::UnknownRoom { room_id: room_id.clone() });
        }
        factory.get(room_id).ok_or_else(|| NotificationError::UnknownRoom { room_id: room_id.clone() })
    }

    /// Release every child and reset to idle.
    pub fn destroy<F: RoomStateFactory + ?Sized>(&mut self, factory: &mut F) {
        for room_id in &self.tracked {
            factory.release(room_id);
        }
        self.tracked.clear();
        self.rooms.clear();
        self.core.clear();
    }

    pub(crate) fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }
}

impl NotificationState for AggregateState {
    fn core(&self) -> &StateCore {
        &self.core
    }
}
