//! Core domain logic for NoteBell.
//! This crate is the single source of truth for note and reminder rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod reminder;
pub mod search;
pub mod service;
pub mod storage;

pub use config::{ConfigError, CoreConfig, NotificationConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteDraft, NoteId, NoteValidationError, Priority};
pub use model::settings::ReminderSettings;
pub use notify::local::{PermissionPolicy, SqliteNotificationPlatform};
pub use notify::platform::{
    NotificationContent, NotificationPlatform, NotificationPriority, NotificationRequest,
    PermissionStatus,
};
pub use notify::service::{AlertStyle, NotificationService};
pub use notify::{NotifyError, NotifyResult};
pub use reminder::buckets::{classify, reminder_buckets, DueStatus, ReminderBuckets};
pub use reminder::trigger::{trigger_epoch_ms, trigger_local, ReminderError};
pub use search::filter::{matches_query, NoteSections, PriorityGroups};
pub use service::note_service::{NoteService, NoteServiceError, ReminderOutcome, SavedNote};
pub use storage::kv_store::{KeyValueStore, SqliteKeyValueStore};
pub use storage::notes_storage::{NotesStorage, NOTES_KEY};
pub use storage::settings_storage::{SettingsStorage, SETTINGS_KEY};
pub use storage::{StorageError, StorageResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
