//! Application layer for Badgeframe
//!
//! A pure state machine and a generic runtime wiring the notification store
//! and the space store to one event stream, enabling deterministic simulation
//! testing with the same code that runs in production.
//!
//! # Components
//!
//! - [`App`]: state machine owning both stores and the settings they watch
//! - [`Driver`]: trait for host-specific I/O abstraction
//! - [`Runtime`]: generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod runtime;

pub use action::AppAction;
pub use app::App;
pub use driver::Driver;
pub use event::AppEvent;
pub use runtime::Runtime;
