//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record persisted in the note list blob.
//! - Provide draft normalization and save-time validation.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `title` is non-empty (after trim) whenever a note is saved.
//! - `due_date` / `reminder_time`, when set, are parseable by
//!   `reminder::trigger`.
//!
//! # See also
//! - reminder::trigger for the accepted date/time shapes.

use crate::reminder::trigger::{parse_due_date, parse_reminder_time};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a note. Also keys its scheduled notification.
pub type NoteId = String;

/// User-selected importance of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical note record.
///
/// Field names are serialized in camelCase so the stored blob stays
/// compatible with lists written by the mobile shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub completed: bool,
    /// Calendar date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Time of day, `HH:MM`. Only scheduled together with `due_date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    /// RFC 3339 UTC creation timestamp.
    pub created_at: String,
}

/// Editable subset of a note, as submitted by a create/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub reminder_time: Option<String>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Trims text fields and drops blank optional values.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            priority: self.priority,
            due_date: non_blank(self.due_date),
            reminder_time: non_blank(self.reminder_time),
        }
    }
}

/// Validation failures for note save paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    InvalidDueDate(String),
    InvalidReminderTime(String),
    DuplicateId(NoteId),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
            Self::InvalidDueDate(value) => {
                write!(f, "invalid due date `{value}`; expected YYYY-MM-DD")
            }
            Self::InvalidReminderTime(value) => {
                write!(f, "invalid reminder time `{value}`; expected HH:MM")
            }
            Self::DuplicateId(id) => write!(f, "duplicate note id: {id}"),
        }
    }
}

impl Error for NoteValidationError {}

impl Note {
    /// Creates a note from a draft with a fresh id and creation timestamp.
    ///
    /// The draft is stored as given; callers normalize before this call.
    pub fn from_draft(draft: NoteDraft) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), draft)
    }

    /// Creates a pending note with a caller-provided id.
    pub fn with_id(id: impl Into<NoteId>, draft: NoteDraft) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            content: draft.content,
            completed: false,
            due_date: draft.due_date,
            reminder_time: draft.reminder_time,
            priority: draft.priority,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Replaces editable fields and re-opens the note.
    ///
    /// Identity and creation time stay.
    pub fn apply_draft(&mut self, draft: NoteDraft) {
        self.completed = false;
        self.title = draft.title;
        self.content = draft.content;
        self.priority = draft.priority;
        self.due_date = draft.due_date;
        self.reminder_time = draft.reminder_time;
    }

    /// Returns whether both halves of a reminder are present.
    pub fn has_reminder(&self) -> bool {
        self.due_date.is_some() && self.reminder_time.is_some()
    }

    /// Drops due date and reminder time.
    pub fn clear_reminder(&mut self) {
        self.due_date = None;
        self.reminder_time = None;
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        if let Some(value) = self.due_date.as_deref() {
            parse_due_date(value)
                .map_err(|_| NoteValidationError::InvalidDueDate(value.to_string()))?;
        }
        if let Some(value) = self.reminder_time.as_deref() {
            parse_reminder_time(value)
                .map_err(|_| NoteValidationError::InvalidReminderTime(value.to_string()))?;
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
