//! Due-date classification for reminder views.
//!
//! # Invariants
//! - Completed notes never land in overdue/today/upcoming buckets.
//! - Comparison is by local calendar day; a note due today is `Today`,
//!   not `Overdue`, for the whole day.
//! - Bucket order follows the input list order.

use crate::model::note::Note;
use crate::reminder::trigger::parse_due_date;
use chrono::NaiveDateTime;
use log::warn;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    Overdue,
    Today,
    Upcoming,
    Completed,
}

impl DueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Today => "today",
            Self::Upcoming => "upcoming",
            Self::Completed => "completed",
        }
    }
}

/// Non-completed notes with a due date, split by due status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderBuckets {
    pub overdue: Vec<Note>,
    pub today: Vec<Note>,
    pub upcoming: Vec<Note>,
}

impl ReminderBuckets {
    pub fn len(&self) -> usize {
        self.overdue.len() + self.today.len() + self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifies one note against the local wall-clock moment `now`.
///
/// Returns `None` for pending notes without a (parseable) due date.
pub fn classify(note: &Note, now: NaiveDateTime) -> Option<DueStatus> {
    if note.completed {
        return Some(DueStatus::Completed);
    }

    let raw = note.due_date.as_deref()?;
    let due = match parse_due_date(raw) {
        Ok(date) => date,
        Err(_) => {
            warn!("event=note_classify module=reminder status=skipped reason=invalid_due_date");
            return None;
        }
    };

    let today = now.date();
    Some(if due == today {
        DueStatus::Today
    } else if due < today {
        DueStatus::Overdue
    } else {
        DueStatus::Upcoming
    })
}

pub fn reminder_buckets(notes: &[Note], now: NaiveDateTime) -> ReminderBuckets {
    let mut buckets = ReminderBuckets::default();
    for note in notes {
        match classify(note, now) {
            Some(DueStatus::Overdue) => buckets.overdue.push(note.clone()),
            Some(DueStatus::Today) => buckets.today.push(note.clone()),
            Some(DueStatus::Upcoming) => buckets.upcoming.push(note.clone()),
            Some(DueStatus::Completed) | None => {}
        }
    }
    buckets
}
