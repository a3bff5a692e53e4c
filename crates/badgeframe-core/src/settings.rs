//! Settings service.
//!
//! Synchronous reads through [`SettingsStore::get_value`] and change
//! subscriptions through [`SettingsStore::watch_setting`]. Watchers are
//! `tokio::sync::watch` receivers, so unregistering is simply dropping the
//! [`SettingWatcher`]; a destroyed state can never leave a dangling
//! subscription behind.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Settings consumed by the notification stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Do not render rooms with only non-notifying activity as unread.
    pub hide_bold: bool,
    /// Track per-thread notification state.
    pub feature_threads: bool,
    /// Build the space hierarchy and per-space badges.
    pub feature_spaces: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { hide_bold: false, feature_threads: true, feature_spaces: true }
    }
}

/// Name of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// See [`Settings::hide_bold`].
    HideBold,
    /// See [`Settings::feature_threads`].
    FeatureThreads,
    /// See [`Settings::feature_spaces`].
    FeatureSpaces,
}

/// Settings store with per-key change channels.
#[derive(Debug)]
pub struct SettingsStore {
    hide_bold: watch::Sender<bool>,
    feature_threads: watch::Sender<bool>,
    feature_spaces: watch::Sender<bool>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsStore {
    /// Create a store seeded with `settings`.
    pub fn new(settings: Settings) -> Self {
        Self {
            hide_bold: watch::Sender::new(settings.hide_bold),
            feature_threads: watch::Sender::new(settings.feature_threads),
            feature_spaces: watch::Sender::new(settings.feature_spaces),
        }
    }

    fn sender(&self, key: SettingKey) -> &watch::Sender<bool> {
        match key {
            SettingKey::HideBold => &self.hide_bold,
            SettingKey::FeatureThreads => &self.feature_threads,
            SettingKey::FeatureSpaces => &self.feature_spaces,
        }
    }

    /// Current value of a setting.
    pub fn get_value(&self, key: SettingKey) -> bool {
        *self.sender(key).borrow()
    }

    /// Change a setting. Watchers are only woken if the value differs.
    ///
    /// Returns `true` if the value changed.
    pub fn set_value(&self, key: SettingKey, value: bool) -> bool {
        let changed = self.sender(key).send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
        if changed {
            tracing::debug!(?key, value, "setting changed");
        }
        changed
    }

    /// Subscribe to changes of a setting.
    pub fn watch_setting(&self, key: SettingKey) -> SettingWatcher {
        SettingWatcher { key, rx: self.sender(key).subscribe() }
    }

    /// All current values.
    pub fn settings(&self) -> Settings {
        Settings {
            hide_bold: self.get_value(SettingKey::HideBold),
            feature_threads: self.get_value(SettingKey::FeatureThreads),
            feature_spaces: self.get_value(SettingKey::FeatureSpaces),
        }
    }
}

/// Subscription to one setting. Dropping it unsubscribes.
#[derive(Debug, Clone)]
pub struct SettingWatcher {
    key: SettingKey,
    rx: watch::Receiver<bool>,
}

impl SettingWatcher {
    /// Watched setting.
    pub fn key(&self) -> SettingKey {
        self.key
    }

    /// Current value without consuming the change flag.
    pub fn value(&self) -> bool {
        *self.rx.borrow()
    }

    /// New value if the setting changed since the last poll.
    ///
    /// A closed store reads as "no change".
    pub fn poll_changed(&mut self) -> Option<bool> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            Ok(false) | Err(_) => None,
        }
    }
}
