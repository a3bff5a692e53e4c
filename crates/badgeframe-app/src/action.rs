//! Application outputs.
//!
//! This module defines the [`AppAction`] enum, which represents what the
//! [`crate::App`] state machine hands back for the runtime to publish.

use badgeframe_core::NotificationUpdate;
use badgeframe_spaces::SpaceAction;
use serde::Serialize;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AppAction {
    /// A badge changed.
    Notification(NotificationUpdate),

    /// A space panel change. Never carries [`SpaceAction::Notification`];
    /// those are flattened into [`AppAction::Notification`].
    Space(SpaceAction),
}

impl From<SpaceAction> for AppAction {
    fn from(action: SpaceAction) -> Self {
        match action {
            SpaceAction::Notification(update) => Self::Notification(update),
            other => Self::Space(other),
        }
    }
}

impl From<NotificationUpdate> for AppAction {
    fn from(update: NotificationUpdate) -> Self {
        Self::Notification(update)
    }
}
