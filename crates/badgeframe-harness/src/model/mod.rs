//! Reference model for model-based testing.
//!
//! [`Operation`]s describe user and server actions over a small id space.
//! Each one mutates the simulated world and yields the app events the host
//! would deliver. [`expected_room_badge`] derives a room badge straight from
//! the raw world data, independently of the store's incremental updates, so
//! the two can be compared after every step.

mod operation;
mod reference;

pub use operation::{Child, ModelRoomId, Operation, Section, room_id, space_id, thread_id, user_id};
pub use reference::expected_room_badge;
