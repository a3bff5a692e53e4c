//! Generic runtime for notification orchestration.
//!
//! The Runtime drives the event loop, coordinating between:
//! - [`App`]: notification and space state machine
//! - [`Driver`]: host-specific I/O

use badgeframe_core::{MatrixClient, Settings};

use crate::{App, Driver};

/// Generic runtime that feeds driver events through an [`App`].
///
/// # Type Parameters
///
/// - `D`: Host-specific I/O driver
/// - `C`: Protocol client the stores read from
pub struct Runtime<D, C>
where
    D: Driver,
{
    driver: D,
    app: App<C>,
}

impl<D, C> Runtime<D, C>
where
    D: Driver,
    C: MatrixClient + Clone,
{
    /// Create a new runtime over `client`.
    pub fn new(driver: D, client: C, settings: Settings) -> Self {
        Self { driver, app: App::new(client, settings) }
    }

    /// Current application state.
    pub fn app(&self) -> &App<C> {
        &self.app
    }

    /// Run until the driver runs out of events.
    ///
    /// Each event is handled to completion and its actions published before
    /// the next one is polled. Returns the final application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error. The driver is
    /// stopped either way.
    pub async fn run(mut self) -> Result<App<C>, D::Error> {
        let result = self.event_loop().await;
        self.driver.stop();
        result.map(|processed| {
            tracing::info!(processed, "runtime stopped");
            self.app
        })
    }

    async fn event_loop(&mut self) -> Result<usize, D::Error> {
        let mut processed = 0;
        while let Some(event) = self.driver.poll_event().await? {
            let actions = self.app.handle(event);
            tracing::trace!(actions = actions.len(), "event handled");
            self.driver.publish(&actions).await?;
            processed += 1;
        }
        Ok(processed)
    }
}
