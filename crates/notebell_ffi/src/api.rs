//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level note and reminder functions to Dart via FRB.
//! - Surface delivered local notifications to the shell (`notifications_take_due`).
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported in envelopes (`ok=false` + message), never thrown.
//! - Dates cross the boundary as strings (`YYYY-MM-DD`, `HH:MM`, RFC 3339).

use chrono::{Local, Utc};
use log::warn;
use notebell_core::db::open_db;
use notebell_core::{
    classify, core_version as core_version_inner, init_logging as init_logging_inner, CoreConfig,
    Note, NoteDraft, NoteService, NoteServiceError, NotificationRequest, PermissionPolicy,
    PermissionStatus, Priority, SqliteKeyValueStore, SqliteNotificationPlatform,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const ENTRY_DB_FILE_NAME: &str = "notebell_entry.sqlite3";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static ENTRY_PERMISSION_POLICY: OnceLock<PermissionPolicy> = OnceLock::new();

type EntryService<'conn> =
    NoteService<SqliteKeyValueStore<'conn>, SqliteNotificationPlatform<'conn>>;

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the database file used by all later calls.
///
/// Must be called before the first note operation; later calls with a
/// different path are rejected. Returns empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "db path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = ENTRY_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "db path already set to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Note projection handed to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub completed: bool,
    pub due_date: Option<String>,
    pub reminder_time: Option<String>,
    /// `low|medium|high`.
    pub priority: String,
    pub created_at: String,
    /// `overdue|today|upcoming|completed`, or `None` for undated pending notes.
    pub due_status: Option<String>,
}

/// Response envelope for note list calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub pending: Vec<NoteItem>,
    pub completed: Vec<NoteItem>,
    pub message: String,
}

/// Response envelope for note mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    pub note: Option<NoteItem>,
    /// `none|disabled|scheduled|permission_denied|cancelled`.
    pub reminder: String,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<NoteItem>, reminder: &str) -> Self {
        Self {
            ok: true,
            note,
            reminder: reminder.to_string(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            reminder: "none".to_string(),
            message: message.into(),
        }
    }
}

/// Reminder screen payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemindersResponse {
    pub overdue: Vec<NoteItem>,
    pub today: Vec<NoteItem>,
    pub upcoming: Vec<NoteItem>,
    pub message: String,
}

/// Notification whose trigger time has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredNotification {
    /// Owning note id.
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub sound: bool,
    pub vibrate: bool,
    pub trigger_at_ms: i64,
}

/// Lists notes matching `query`, split into pending and completed.
///
/// # FFI contract
/// - Fail-soft: storage failures produce empty lists and a message.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list(query: Option<String>) -> NotesListResponse {
    let query = query.unwrap_or_default();
    match with_service(|service| Ok(service.note_sections(&query))) {
        Ok(sections) => {
            let message = format!(
                "{} pending, {} completed.",
                sections.pending.len(),
                sections.completed.len()
            );
            NotesListResponse {
                pending: to_items(sections.pending),
                completed: to_items(sections.completed),
                message,
            }
        }
        Err(err) => NotesListResponse {
            pending: Vec::new(),
            completed: Vec::new(),
            message: format!("notes_list failed: {err}"),
        },
    }
}

/// Creates a note; schedules its reminder when due date and time are set.
///
/// Unknown `priority` strings fall back to `medium`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(
    title: String,
    content: String,
    priority: String,
    due_date: Option<String>,
    reminder_time: Option<String>,
) -> NoteActionResponse {
    let draft = to_draft(title, content, &priority, due_date, reminder_time);
    match with_service(|service| service.create_note(draft)) {
        Ok(saved) => NoteActionResponse::success(
            "Note created.",
            Some(to_item(saved.note)),
            saved.reminder.as_str(),
        ),
        Err(err) => NoteActionResponse::failure(format!("note_create failed: {err}")),
    }
}

/// Replaces the editable fields of note `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(
    id: String,
    title: String,
    content: String,
    priority: String,
    due_date: Option<String>,
    reminder_time: Option<String>,
) -> NoteActionResponse {
    let draft = to_draft(title, content, &priority, due_date, reminder_time);
    match with_service(|service| service.update_note(id.trim(), draft)) {
        Ok(saved) => NoteActionResponse::success(
            "Note updated.",
            Some(to_item(saved.note)),
            saved.reminder.as_str(),
        ),
        Err(err) => NoteActionResponse::failure(format!("note_update failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_toggle_completion(id: String) -> NoteActionResponse {
    note_action("note_toggle_completion", "Note toggled.", |service| {
        service.toggle_completion(id.trim())
    })
}

/// Marks note `id` completed and cancels its notification.
#[flutter_rust_bridge::frb(sync)]
pub fn note_mark_complete(id: String) -> NoteActionResponse {
    note_action("note_mark_complete", "Note completed.", |service| {
        service.mark_complete(id.trim())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: String) -> NoteActionResponse {
    match with_service(|service| service.delete_note(id.trim())) {
        Ok(_) => NoteActionResponse::success("Note deleted.", None, "cancelled"),
        Err(err) => NoteActionResponse::failure(format!("note_delete failed: {err}")),
    }
}

/// Cancels the reminder of note `id` and clears its due date and time.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_cancel(id: String) -> NoteActionResponse {
    match with_service(|service| service.cancel_reminder(id.trim())) {
        Ok(note) => NoteActionResponse::success("Reminder cancelled.", Some(to_item(note)), "cancelled"),
        Err(err) => NoteActionResponse::failure(format!("reminder_cancel failed: {err}")),
    }
}

/// Deletes every note and cancels every scheduled notification.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_clear_all() -> NoteActionResponse {
    match with_service(|service| service.clear_all_notes()) {
        Ok(()) => NoteActionResponse::success("All notes deleted.", None, "cancelled"),
        Err(err) => NoteActionResponse::failure(format!("notes_clear_all failed: {err}")),
    }
}

/// Buckets pending dated notes against the device's local time.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_overview() -> RemindersResponse {
    let now = Local::now().naive_local();
    match with_service(|service| Ok(service.reminder_buckets(now))) {
        Ok(buckets) => RemindersResponse {
            message: format!("{} reminder(s).", buckets.len()),
            overdue: to_items(buckets.overdue),
            today: to_items(buckets.today),
            upcoming: to_items(buckets.upcoming),
        },
        Err(err) => RemindersResponse {
            overdue: Vec::new(),
            today: Vec::new(),
            upcoming: Vec::new(),
            message: format!("reminders_overview failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn notifications_check_permissions() -> bool {
    with_service(|service| Ok(service.notifications().check_permissions())).unwrap_or(false)
}

#[flutter_rust_bridge::frb(sync)]
pub fn notifications_request_permissions() -> bool {
    with_service(|service| Ok(service.notifications().request_permissions())).unwrap_or(false)
}

/// Records the OS permission decision made by the shell.
///
/// Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_permission_set(granted: bool) -> String {
    let status = if granted {
        PermissionStatus::Granted
    } else {
        PermissionStatus::Denied
    };
    match with_service(|service| {
        service
            .notifications()
            .platform()
            .set_permission(status)
            .map_err(NoteServiceError::Notify)
    }) {
        Ok(()) => String::new(),
        Err(err) => format!("notification_permission_set failed: {err}"),
    }
}

/// Removes and returns notifications whose trigger time has passed.
///
/// The shell shows each returned item as a system notification.
#[flutter_rust_bridge::frb(sync)]
pub fn notifications_take_due() -> Vec<DeliveredNotification> {
    let now_ms = Utc::now().timestamp_millis();
    let result = with_service(|service| {
        service
            .notifications()
            .platform()
            .take_due(now_ms)
            .map_err(NoteServiceError::Notify)
    });
    match result {
        Ok(due) => due.into_iter().map(to_delivered).collect(),
        Err(err) => {
            warn!("event=ffi_take_due module=ffi status=error error={err}");
            Vec::new()
        }
    }
}

fn note_action(
    name: &str,
    message: &str,
    f: impl FnOnce(&mut EntryService<'_>) -> Result<Note, NoteServiceError>,
) -> NoteActionResponse {
    match with_service(f) {
        Ok(note) => NoteActionResponse::success(message, Some(to_item(note)), "none"),
        Err(err) => NoteActionResponse::failure(format!("{name} failed: {err}")),
    }
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            let mut config = CoreConfig {
                db_path: std::env::temp_dir().join(ENTRY_DB_FILE_NAME),
                ..CoreConfig::default()
            };
            if let Err(err) = config.apply_overrides(|key| std::env::var(key).ok()) {
                warn!("event=ffi_config module=ffi status=error error={err}");
            }
            config.db_path
        })
        .clone()
}

fn resolve_permission_policy() -> PermissionPolicy {
    *ENTRY_PERMISSION_POLICY.get_or_init(|| {
        let mut config = CoreConfig::default();
        match config.apply_overrides(|key| std::env::var(key).ok()) {
            Ok(()) => config.notifications.permission_policy,
            Err(_) => PermissionPolicy::default(),
        }
    })
}

fn with_service<T>(
    f: impl FnOnce(&mut EntryService<'_>) -> Result<T, NoteServiceError>,
) -> Result<T, String> {
    let db_path = resolve_entry_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("entry DB open failed: {err}"))?;
    let mut service = NoteService::new(
        SqliteKeyValueStore::new(&conn),
        SqliteNotificationPlatform::new(&conn, resolve_permission_policy()),
    );
    f(&mut service).map_err(|err| err.to_string())
}

fn to_draft(
    title: String,
    content: String,
    priority: &str,
    due_date: Option<String>,
    reminder_time: Option<String>,
) -> NoteDraft {
    NoteDraft {
        title,
        content,
        priority: Priority::parse(priority).unwrap_or_default(),
        due_date,
        reminder_time,
    }
}

fn to_items(notes: Vec<Note>) -> Vec<NoteItem> {
    notes.into_iter().map(to_item).collect()
}

fn to_item(note: Note) -> NoteItem {
    let due_status = classify(&note, Local::now().naive_local()).map(|status| status.as_str().to_string());
    NoteItem {
        id: note.id,
        title: note.title,
        content: note.content,
        completed: note.completed,
        due_date: note.due_date,
        reminder_time: note.reminder_time,
        priority: note.priority.as_str().to_string(),
        created_at: note.created_at,
        due_status,
    }
}

fn to_delivered(request: NotificationRequest) -> DeliveredNotification {
    DeliveredNotification {
        identifier: request.identifier,
        title: request.content.title,
        body: request.content.body,
        sound: request.content.sound,
        vibrate: request.content.vibrate,
        trigger_at_ms: request.trigger_at_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        configure_db_path, core_version, init_logging, note_create, note_delete,
        note_toggle_completion, notes_list, notifications_take_due, reminder_cancel,
        reminders_overview,
    };
    use super::{ENTRY_DB_PATH, ENTRY_PERMISSION_POLICY};
    use notebell_core::db::open_db;
    use notebell_core::PermissionPolicy;
    use std::sync::{Mutex, MutexGuard};
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_db_path_rejects_switching_once_resolved() {
        let _entry = use_test_entry();
        let active = super::resolve_entry_db_path();
        assert!(configure_db_path(active.display().to_string()).is_empty());
        assert!(!configure_db_path("/definitely/another.sqlite3".to_string()).is_empty());
        assert!(!configure_db_path("   ".to_string()).is_empty());
    }

    #[test]
    fn note_create_then_list_finds_note_by_search() {
        let _entry = use_test_entry();
        let token = unique_token("ffi-create");
        let created = note_create(token.clone(), "body".to_string(), "HIGH".to_string(), None, None);
        assert!(created.ok, "{}", created.message);
        let item = created.note.expect("created note should be returned");
        assert_eq!(item.priority, "high");
        assert_eq!(item.due_status, None);

        let listed = notes_list(Some(token.to_uppercase()));
        assert!(listed.pending.iter().any(|note| note.id == item.id));
    }

    #[test]
    fn note_create_rejects_blank_title() {
        let _entry = use_test_entry();
        let response = note_create("  ".to_string(), String::new(), "low".to_string(), None, None);
        assert!(!response.ok);
        assert!(response.message.contains("title"));
    }

    #[test]
    fn toggle_and_delete_round_trip() {
        let _entry = use_test_entry();
        let created = note_create(unique_token("ffi-toggle"), String::new(), "medium".to_string(), None, None);
        let id = created.note.expect("note").id;

        let toggled = note_toggle_completion(id.clone());
        assert!(toggled.ok, "{}", toggled.message);
        assert_eq!(toggled.note.map(|note| note.completed), Some(true));

        assert!(note_delete(id.clone()).ok);
        assert!(!note_delete(id).ok);
    }

    #[test]
    fn past_reminder_is_overdue_and_delivered_once() {
        let _entry = use_test_entry();
        let created = note_create(
            unique_token("ffi-due"),
            "past".to_string(),
            "high".to_string(),
            Some("2000-01-01".to_string()),
            Some("10:00".to_string()),
        );
        assert!(created.ok, "{}", created.message);
        assert_eq!(created.reminder, "scheduled");
        let id = created.note.expect("note").id;

        let overview = reminders_overview();
        assert!(overview.overdue.iter().any(|note| note.id == id));

        let conn = open_db(super::resolve_entry_db_path()).expect("open db");
        let pending: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM scheduled_notifications WHERE identifier = ?1",
                [id.as_str()],
                |row| row.get(0),
            )
            .expect("count scheduled rows");
        assert_eq!(pending, 1);

        let delivered = notifications_take_due();
        assert!(delivered.iter().any(|item| item.identifier == id));
        assert!(!notifications_take_due()
            .iter()
            .any(|item| item.identifier == id));

        let cancelled = reminder_cancel(id);
        assert!(cancelled.ok, "{}", cancelled.message);
        assert_eq!(cancelled.note.and_then(|note| note.due_date), None);
    }

    /// Pins a per-process database and an auto-granting permission policy
    /// before any call resolves them from the environment. The guard keeps
    /// whole-list writes of parallel tests from interleaving.
    fn use_test_entry() -> MutexGuard<'static, ()> {
        static ENTRY_LOCK: Mutex<()> = Mutex::new(());
        let guard = ENTRY_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let path = std::env::temp_dir().join(format!(
            "notebell_ffi_test_{}.sqlite3",
            std::process::id()
        ));
        ENTRY_DB_PATH.get_or_init(|| path);
        ENTRY_PERMISSION_POLICY.get_or_init(|| PermissionPolicy::AutoGrant);
        guard
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
