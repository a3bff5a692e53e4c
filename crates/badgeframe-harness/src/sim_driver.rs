//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` replays injected events through the same
//! [`badgeframe_app::Runtime`] loop a host would run, recording everything
//! published so tests can assert on it afterwards.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use badgeframe_app::{AppAction, AppEvent, Driver};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Shared state for event injection.
///
/// This allows injection and inspection from outside async contexts.
#[derive(Debug, Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    published: Vec<AppAction>,
    publish_calls: usize,
    fail_publish: bool,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Cloning yields a handle onto the same queues, so a test can keep one
/// handle while the runtime owns another.
#[derive(Debug, Clone, Default)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
}

impl SimDriver {
    /// Create a new simulation driver.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Inject several events in order.
    pub fn inject_events(&self, events: impl IntoIterator<Item = AppEvent>) {
        self.lock().pending_events.extend(events);
    }

    /// Make every later publish fail.
    pub fn fail_publish(&self) {
        self.lock().fail_publish = true;
    }

    /// Take all actions published so far.
    pub fn take_published(&self) -> Vec<AppAction> {
        std::mem::take(&mut self.lock().published)
    }

    /// Number of publish calls, one per handled event.
    pub fn publish_calls(&self) -> usize {
        self.lock().publish_calls
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        !self.lock().pending_events.is_empty()
    }

    /// Whether the runtime stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.lock().pending_events.pop_front())
    }

    async fn publish(&mut self, actions: &[AppAction]) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if state.fail_publish {
            return Err(SimDriverError("publish rejected".into()));
        }
        state.publish_calls += 1;
        state.published.extend_from_slice(actions);
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inject_event_queues_event() {
        let driver = SimDriver::new();
        driver.inject_event(AppEvent::NotReady);

        assert!(driver.has_pending());
    }

    #[test]
    fn clones_share_queues() {
        let driver = SimDriver::new();
        let handle = driver.clone();
        driver.inject_events([AppEvent::NotReady, AppEvent::SettingsChanged]);

        assert!(handle.has_pending());
        assert_eq!(handle.publish_calls(), 0);
    }
}
