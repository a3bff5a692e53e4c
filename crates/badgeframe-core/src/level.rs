//! Notification severity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a notification badge.
///
/// Variants are declared in ascending order so the derived [`Ord`] is the
/// display precedence. Aggregates take the maximum across children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NotificationLevel {
    /// Nothing to show.
    #[default]
    None,
    /// Unread messages that do not notify (bold room name).
    Activity,
    /// Unread notifying messages (grey badge).
    Notification,
    /// Mentions, keywords or pending invites (red badge).
    Highlight,
    /// Locally queued messages that failed to send. Shown above everything.
    Unsent,
}

impl NotificationLevel {
    /// Higher of two levels.
    pub fn max_of(self, other: Self) -> Self {
        self.max(other)
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Activity => "activity",
            Self::Notification => "notification",
            Self::Highlight => "highlight",
            Self::Unsent => "unsent",
        };
        f.write_str(name)
    }
}
