//! Notification state for Badgeframe
//!
//! Pure state machines that turn a Matrix client's view of rooms into the
//! badges a client UI renders: per room, per thread, per room list section,
//! per space and globally. No I/O happens here; the client is read through
//! the [`MatrixClient`] trait and changes arrive as [`ClientEvent`] values.
//!
//! # Components
//!
//! - [`RoomNotificationState`]: badge of one room, with an optional
//!   [`RoomThreadsNotificationState`] roll-up of its threads
//! - [`ListNotificationState`] and [`SpaceNotificationState`]: aggregates over
//!   a room set, built on [`AggregateState`]
//! - [`RoomStateRegistry`]: one reference-counted state per room
//! - [`NotificationStore`]: two-phase event propagation to rooms, lists and
//!   the [`SummarizedNotificationState`]
//! - [`SettingsStore`]: settings with per-key watchers

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod aggregate;
mod client;
pub mod diff;
mod error;
mod event;
mod ids;
mod level;
mod list;
mod registry;
mod room;
mod settings;
mod space;
mod state;
mod store;
mod summary;
mod thread;
mod update;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use aggregate::{AggregateState, RoomStateFactory};
pub use client::{DirectMap, MatrixClient, Membership, UnreadKind, unread_or_zero};
pub use error::NotificationError;
pub use event::ClientEvent;
pub use ids::{RoomId, SpaceKey, TagId, ThreadId, UserId};
pub use level::NotificationLevel;
pub use list::ListNotificationState;
pub use registry::RoomStateRegistry;
pub use room::RoomNotificationState;
pub use settings::{SettingKey, SettingWatcher, Settings, SettingsStore};
pub use space::SpaceNotificationState;
pub use state::{NotificationSnapshot, NotificationState, SYMBOL_ALERT, StateCore};
pub use store::NotificationStore;
pub use summary::SummarizedNotificationState;
pub use thread::{RoomThreadsNotificationState, ThreadNotificationState};
pub use update::{NotificationUpdate, Propagation, StateKey};
