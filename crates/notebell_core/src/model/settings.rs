//! Reminder preferences persisted next to the note list.

use serde::{Deserialize, Serialize};

/// User-level switches for reminder delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReminderSettings {
    /// When false, saving a note never schedules a notification.
    pub enabled: bool,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}
