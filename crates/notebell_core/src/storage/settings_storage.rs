//! Reminder settings persistence under `SETTINGS_KEY`.

use crate::model::settings::ReminderSettings;
use crate::storage::kv_store::KeyValueStore;
use crate::storage::{StorageError, StorageResult};
use log::{info, warn};

pub const SETTINGS_KEY: &str = "@reminder_settings";

pub struct SettingsStorage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SettingsStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns stored settings, falling back to defaults on any failure.
    pub fn get_settings(&self) -> ReminderSettings {
        let raw = match self.store.get_item(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ReminderSettings::default(),
            Err(err) => {
                warn!("event=settings_load module=storage status=error error={err}");
                return ReminderSettings::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("event=settings_load module=storage status=error error_code=settings_decode_failed error={err}");
            ReminderSettings::default()
        })
    }

    pub fn save_settings(&self, settings: &ReminderSettings) -> StorageResult<()> {
        let blob = serde_json::to_string(settings).map_err(|source| StorageError::Serde {
            key: SETTINGS_KEY,
            source,
        })?;
        self.store.set_item(SETTINGS_KEY, &blob)?;
        info!(
            "event=settings_save module=storage status=ok enabled={} sound={} vibration={}",
            settings.enabled, settings.sound_enabled, settings.vibration_enabled
        );
        Ok(())
    }
}
