//! Spaces for Badgeframe
//!
//! The [`SpaceStore`] turns `m.space.child` edges into the space panel: which
//! spaces are roots, which rooms each space shows, and the badge of every
//! space button. Like the rest of Badgeframe it performs no I/O; operations
//! return [`SpaceAction`]s for the host to carry out.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod error;
mod store;

pub use action::SpaceAction;
pub use error::SpaceError;
pub use store::SpaceStore;
