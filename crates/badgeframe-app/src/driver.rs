//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the notification runtime from the host. A
//! desktop shell feeds SDK callbacks and UI input through it and paints badges
//! from the published actions; the simulation harness replays a scripted
//! event queue instead.

use std::future::Future;

use crate::{AppAction, AppEvent};

/// Abstracts I/O operations for the notification runtime.
///
/// Implementations provide host-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration, so the same loop runs in
/// production and in simulation.
pub trait Driver: Send {
    /// Host-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next input event.
    ///
    /// Returns `None` once the host is shutting down.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Hand the actions produced by one event to the host.
    ///
    /// Called once per event, including with an empty slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the host can no longer accept updates.
    fn publish(&mut self, actions: &[AppAction])
    -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Release host resources.
    fn stop(&mut self);
}
