//! Deterministic simulation harness for Badgeframe notification testing.
//!
//! A shared simulated client world plus a scripted [`Driver`] implementation,
//! so the production [`badgeframe_app::Runtime`] and [`badgeframe_app::App`]
//! run unchanged under test.
//!
//! # Model-Based Testing
//!
//! The `model` module provides random [`Operation`]s over a small id space
//! and a reference computation of room badges. Operations are applied to the
//! world and the app, and every room badge is compared against the reference.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the full set.
//!
//! [`Driver`]: badgeframe_app::Driver

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;
pub mod sim_client;
pub mod sim_driver;

pub use invariants::{
    AggregateSnapshot, AggregateSumMax, Invariant, InvariantRegistry, InvariantResult,
    MatchesReference, MuteForcesNone, RegistryRefcounts, RoomSnapshot, SummaryCoversLists,
    SummarySnapshot, SystemSnapshot, UnsentPrecedence, Violation,
};
pub use model::{Child, ModelRoomId, Operation, Section, expected_room_badge};
pub use sim_client::SimClient;
pub use sim_driver::{SimDriver, SimDriverError};
