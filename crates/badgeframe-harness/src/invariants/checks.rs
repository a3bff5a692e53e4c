//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::{BTreeMap, BTreeSet};

use badgeframe_core::{NotificationLevel, RoomId, SYMBOL_ALERT};

use super::{Invariant, InvariantResult, SystemSnapshot};

/// Unsent local echoes outrank every other room outcome.
///
/// A room whose client reports unsent events shows `Unsent` with the alert
/// symbol and a count of one, even when muted or invited.
pub struct UnsentPrecedence;

impl Invariant for UnsentPrecedence {
    fn name(&self) -> &'static str {
        "unsent_precedence"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (room_id, room) in &state.rooms {
            if !room.unsent {
                continue;
            }
            let badge = room.badge;
            if badge.level != NotificationLevel::Unsent
                || badge.symbol != Some(SYMBOL_ALERT)
                || badge.count != 1
            {
                return Err(self.violation(format!("room {room_id} has unsent events but shows {badge:?}")));
            }
        }
        Ok(())
    }
}

/// Muted rooms without unsent events are idle.
pub struct MuteForcesNone;

impl Invariant for MuteForcesNone {
    fn name(&self) -> &'static str {
        "mute_forces_none"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (room_id, room) in &state.rooms {
            if !room.muted || room.unsent {
                continue;
            }
            if room.badge.level != NotificationLevel::None || room.badge.count != 0 {
                return Err(self.violation(format!("muted room {room_id} shows {:?}", room.badge)));
            }
            if !room.badge.muted {
                return Err(self.violation(format!("muted room {room_id} not flagged muted")));
            }
        }
        Ok(())
    }
}

/// Aggregates are a pure function of their tracked rooms.
///
/// Summing aggregates carry the saturating sum of counts and the maximum
/// level. Tile-count aggregates carry the number of rooms, at `Highlight`
/// when non-empty. Neither ever shows a symbol, and every tracked room must
/// have a registry state.
pub struct AggregateSumMax;

impl Invariant for AggregateSumMax {
    fn name(&self) -> &'static str {
        "aggregate_sum_max"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for agg in &state.aggregates {
            let key = &agg.key;
            if agg.badge.symbol.is_some() {
                return Err(self.violation(format!("{key:?} shows a symbol")));
            }

            let (count, level) = if agg.by_tile_count {
                let level = if agg.rooms.is_empty() {
                    NotificationLevel::None
                } else {
                    NotificationLevel::Highlight
                };
                (agg.rooms.len() as u64, level)
            } else {
                let mut count = 0u64;
                let mut level = NotificationLevel::None;
                for room_id in &agg.rooms {
                    let Some(room) = state.rooms.get(room_id) else {
                        return Err(self.violation(format!("{key:?} tracks unregistered room {room_id}")));
                    };
                    count = count.saturating_add(room.badge.count);
                    level = level.max(room.badge.level);
                }
                (count, level)
            };

            if agg.badge.count != count || agg.badge.level != level {
                return Err(self.violation(format!(
                    "{key:?} shows {} at {}, children give {count} at {level}",
                    agg.badge.count, agg.badge.level
                )));
            }
        }
        Ok(())
    }
}

/// Each room state is referenced exactly once per tracking aggregate.
///
/// A state with no tracker would leak; a tracker without a state would read
/// stale data.
pub struct RegistryRefcounts;

impl Invariant for RegistryRefcounts {
    fn name(&self) -> &'static str {
        "registry_refcounts"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let mut trackers: BTreeMap<&RoomId, usize> = BTreeMap::new();
        for agg in &state.aggregates {
            let distinct: BTreeSet<&RoomId> = agg.rooms.iter().collect();
            if distinct.len() != agg.rooms.len() {
                return Err(self.violation(format!("{:?} tracks a room twice", agg.key)));
            }
            for room_id in distinct {
                *trackers.entry(room_id).or_default() += 1;
            }
        }

        for (room_id, room) in &state.rooms {
            let expected = trackers.remove(room_id).unwrap_or(0);
            if room.refs != expected {
                return Err(self.violation(format!(
                    "room {room_id} has {} refs but {expected} trackers",
                    room.refs
                )));
            }
        }
        if let Some((room_id, count)) = trackers.into_iter().next() {
            return Err(self.violation(format!("room {room_id} tracked {count} times without a state")));
        }
        Ok(())
    }
}

/// The summary rolls up every room shown in at least one list.
pub struct SummaryCoversLists;

impl Invariant for SummaryCoversLists {
    fn name(&self) -> &'static str {
        "summary_covers_lists"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let listed: BTreeSet<&RoomId> = state.lists().flat_map(|list| list.rooms.iter()).collect();

        let mut count = 0u64;
        let mut level = NotificationLevel::None;
        let mut unread = 0usize;
        for room in listed.iter().filter_map(|id| state.rooms.get(*id)) {
            count = count.saturating_add(room.badge.count);
            level = level.max(room.badge.level);
            if room.badge.level >= NotificationLevel::Notification {
                unread += 1;
            }
        }

        let summary = &state.summary;
        if summary.badge.count != count
            || summary.badge.level != level
            || summary.num_unread_states != unread
        {
            return Err(self.violation(format!(
                "summary shows {} at {} over {} unread, lists give {count} at {level} over {unread}",
                summary.badge.count, summary.badge.level, summary.num_unread_states
            )));
        }
        Ok(())
    }
}

/// Incrementally maintained room badges equal a from-scratch computation.
pub struct MatchesReference;

impl Invariant for MatchesReference {
    fn name(&self) -> &'static str {
        "matches_reference"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (room_id, room) in &state.rooms {
            if room.badge != room.expected {
                return Err(self.violation(format!(
                    "room {room_id} shows {:?}, expected {:?}",
                    room.badge, room.expected
                )));
            }
        }
        Ok(())
    }
}
