//! Note use-case service.
//!
//! # Responsibility
//! - Provide create/edit/complete/delete flows over the whole-list storage.
//! - Keep each note's scheduled notification in step with its reminder.
//! - Expose filtered read models (search, sections, priorities, buckets).
//!
//! # Invariants
//! - Mutations are replace-by-identifier and rewrite the whole list.
//! - Mutations read the list strictly; a corrupt blob is never overwritten.
//! - A denied notification permission does not block saving the note.
//! - A failed save leaves the notification schedule as it was.
//! - Read paths are fail-soft and return empty results on storage failure.

use crate::model::note::{Note, NoteDraft, NoteId, NoteValidationError};
use crate::model::settings::ReminderSettings;
use crate::notify::platform::{NotificationPlatform, NotificationRequest};
use crate::notify::service::{AlertStyle, NotificationService};
use crate::notify::NotifyError;
use crate::reminder::buckets::{reminder_buckets, ReminderBuckets};
use crate::search::filter::{
    group_by_priority, search, split_by_completion, NoteSections, PriorityGroups,
};
use crate::storage::kv_store::KeyValueStore;
use crate::storage::notes_storage::NotesStorage;
use crate::storage::settings_storage::SettingsStorage;
use crate::storage::StorageError;
use chrono::NaiveDateTime;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    Validation(NoteValidationError),
    NoteNotFound(NoteId),
    Storage(StorageError),
    /// Reminder could not be scheduled for a reason other than permission.
    Notify(NotifyError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Notify(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NoteNotFound(_) => None,
            Self::Storage(err) => Some(err),
            Self::Notify(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for NoteServiceError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Validation(err) => Self::Validation(err),
            other => Self::Storage(other),
        }
    }
}

/// What happened to a note's reminder during a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOutcome {
    /// Note has no complete reminder (or is completed).
    NotRequested,
    /// Reminders are switched off in settings.
    Disabled,
    Scheduled { trigger_at_ms: i64 },
    /// Saved without a working reminder.
    PermissionDenied,
    /// A previous reminder was removed by the edit.
    Cancelled,
}

impl ReminderOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotRequested => "none",
            Self::Disabled => "disabled",
            Self::Scheduled { .. } => "scheduled",
            Self::PermissionDenied => "permission_denied",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Saved note plus the reminder scheduling outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedNote {
    pub note: Note,
    pub reminder: ReminderOutcome,
}

pub struct NoteService<S: KeyValueStore + Clone, P: NotificationPlatform> {
    notes: NotesStorage<S>,
    settings: SettingsStorage<S>,
    notifications: NotificationService<P>,
}

impl<S: KeyValueStore + Clone, P: NotificationPlatform> NoteService<S, P> {
    /// Creates a service; alert style is taken from stored settings.
    pub fn new(store: S, platform: P) -> Self {
        let settings = SettingsStorage::new(store.clone());
        let mut notifications = NotificationService::new(platform);
        notifications.set_alert_style(alert_style(&settings.get_settings()));
        Self {
            notes: NotesStorage::new(store),
            settings,
            notifications,
        }
    }

    pub fn notifications(&self) -> &NotificationService<P> {
        &self.notifications
    }

    /// All notes in stored order.
    pub fn list_notes(&self) -> Vec<Note> {
        self.notes.get_notes()
    }

    pub fn get_note(&self, id: &str) -> Option<Note> {
        self.notes.get_notes().into_iter().find(|note| note.id == id)
    }

    pub fn search_notes(&self, query: &str) -> Vec<Note> {
        search(&self.notes.get_notes(), query)
    }

    /// Search results split into pending and completed sections.
    pub fn note_sections(&self, query: &str) -> NoteSections {
        split_by_completion(self.search_notes(query))
    }

    pub fn priority_groups(&self, query: &str) -> PriorityGroups {
        group_by_priority(self.search_notes(query))
    }

    /// Pending dated notes bucketed against the local moment `now`.
    pub fn reminder_buckets(&self, now: NaiveDateTime) -> ReminderBuckets {
        reminder_buckets(&self.notes.get_notes(), now)
    }

    /// Creates a note and schedules its reminder when it has one.
    ///
    /// # Errors
    /// - `Validation` for a blank title or malformed due date/time.
    /// - `Notify` when scheduling fails for a reason other than permission;
    ///   the note is not saved.
    /// - `Storage` when the list cannot be read or written.
    pub fn create_note(&self, draft: NoteDraft) -> Result<SavedNote, NoteServiceError> {
        let note = Note::from_draft(draft.normalized());
        note.validate()?;

        let mut notes = self.notes.load_notes()?;
        let reminder = self.schedule_reminder(&note)?;
        notes.push(note.clone());
        self.save_or_restore(&notes, &note.id, None)?;

        info!(
            "event=note_create module=service status=ok note_id={} reminder={}",
            note.id,
            reminder.as_str()
        );
        Ok(SavedNote { note, reminder })
    }

    /// Replaces the editable fields of note `id`.
    ///
    /// Identity and creation time are kept; the note is re-opened. The
    /// reminder is rescheduled when still present and cancelled when removed.
    /// When the save fails, the notification pending before the call is put
    /// back.
    pub fn update_note(&self, id: &str, draft: NoteDraft) -> Result<SavedNote, NoteServiceError> {
        let mut notes = self.notes.load_notes()?;
        let index = position_of(&notes, id)?;
        let had_reminder = notes[index].has_reminder();

        let mut updated = notes[index].clone();
        updated.apply_draft(draft.normalized());
        updated.validate()?;

        let previous = self.notifications.scheduled_for(id);
        let mut reminder = match self.schedule_reminder(&updated) {
            Ok(reminder) => reminder,
            Err(err) => {
                self.notifications.restore_notification(id, previous.as_ref());
                return Err(err);
            }
        };
        if !matches!(reminder, ReminderOutcome::Scheduled { .. }) {
            self.notifications.cancel_notification(id);
            if had_reminder && !updated.has_reminder() {
                reminder = ReminderOutcome::Cancelled;
            }
        }

        notes[index] = updated.clone();
        self.save_or_restore(&notes, id, previous.as_ref())?;

        info!(
            "event=note_update module=service status=ok note_id={id} reminder={}",
            reminder.as_str()
        );
        Ok(SavedNote {
            note: updated,
            reminder,
        })
    }

    /// Flips the completion flag of exactly one note.
    pub fn toggle_completion(&self, id: &str) -> Result<Note, NoteServiceError> {
        let note = self.mutate(id, |note| note.completed = !note.completed)?;
        info!(
            "event=note_toggle module=service status=ok note_id={id} completed={}",
            note.completed
        );
        Ok(note)
    }

    /// Marks a note completed and cancels its notification.
    pub fn mark_complete(&self, id: &str) -> Result<Note, NoteServiceError> {
        let note = self.mutate(id, |note| note.completed = true)?;
        self.notifications.cancel_notification(id);
        info!("event=note_complete module=service status=ok note_id={id}");
        Ok(note)
    }

    /// Cancels a note's notification and clears its due date and time.
    pub fn cancel_reminder(&self, id: &str) -> Result<Note, NoteServiceError> {
        let mut notes = self.notes.load_notes()?;
        let index = position_of(&notes, id)?;
        notes[index].clear_reminder();
        self.notes.save_notes(&notes)?;
        self.notifications.cancel_notification(id);
        info!("event=reminder_cancel module=service status=ok note_id={id}");
        Ok(notes[index].clone())
    }

    /// Removes exactly the note with `id` and cancels its notification.
    pub fn delete_note(&self, id: &str) -> Result<Note, NoteServiceError> {
        let mut notes = self.notes.load_notes()?;
        let index = position_of(&notes, id)?;
        let removed = notes.remove(index);
        self.notes.save_notes(&notes)?;
        self.notifications.cancel_notification(id);
        info!(
            "event=note_delete module=service status=ok note_id={id} remaining={}",
            notes.len()
        );
        Ok(removed)
    }

    /// Drops the whole note list and every scheduled notification.
    pub fn clear_all_notes(&self) -> Result<(), NoteServiceError> {
        self.notes.clear_all_notes()?;
        self.notifications.cancel_all_notifications();
        Ok(())
    }

    pub fn settings(&self) -> ReminderSettings {
        self.settings.get_settings()
    }

    /// Persists settings and applies the alert style to later schedules.
    pub fn update_settings(&mut self, settings: ReminderSettings) -> Result<(), NoteServiceError> {
        self.settings.save_settings(&settings)?;
        self.notifications.set_alert_style(alert_style(&settings));
        Ok(())
    }

    fn mutate(&self, id: &str, change: impl FnOnce(&mut Note)) -> Result<Note, NoteServiceError> {
        let mut notes = self.notes.load_notes()?;
        let index = position_of(&notes, id)?;
        change(&mut notes[index]);
        self.notes.save_notes(&notes)?;
        Ok(notes[index].clone())
    }

    fn schedule_reminder(&self, note: &Note) -> Result<ReminderOutcome, NoteServiceError> {
        let (Some(due_date), Some(reminder_time)) =
            (note.due_date.as_deref(), note.reminder_time.as_deref())
        else {
            return Ok(ReminderOutcome::NotRequested);
        };
        if note.completed {
            return Ok(ReminderOutcome::NotRequested);
        }
        if !self.settings.get_settings().enabled {
            return Ok(ReminderOutcome::Disabled);
        }

        match self.notifications.schedule_notification(
            &note.id,
            &note.title,
            &note.content,
            due_date,
            Some(reminder_time),
        ) {
            Ok(trigger_at_ms) => Ok(ReminderOutcome::Scheduled { trigger_at_ms }),
            Err(NotifyError::PermissionDenied) => {
                warn!(
                    "event=note_reminder module=service status=degraded note_id={} error_code=permission_denied",
                    note.id
                );
                Ok(ReminderOutcome::PermissionDenied)
            }
            Err(err) => Err(NoteServiceError::Notify(err)),
        }
    }

    /// Saves `notes`; on failure the notification for `id` goes back to
    /// `previous` so the schedule matches the stored list.
    fn save_or_restore(
        &self,
        notes: &[Note],
        id: &str,
        previous: Option<&NotificationRequest>,
    ) -> Result<(), NoteServiceError> {
        if let Err(err) = self.notes.save_notes(notes) {
            self.notifications.restore_notification(id, previous);
            return Err(err.into());
        }
        Ok(())
    }
}

fn position_of(notes: &[Note], id: &str) -> Result<usize, NoteServiceError> {
    notes
        .iter()
        .position(|note| note.id == id)
        .ok_or_else(|| NoteServiceError::NoteNotFound(id.to_string()))
}

fn alert_style(settings: &ReminderSettings) -> AlertStyle {
    AlertStyle {
        sound: settings.sound_enabled,
        vibrate: settings.vibration_enabled,
    }
}
