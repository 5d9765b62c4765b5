//! Local notification scheduling.
//!
//! # Responsibility
//! - Define the platform notification seam (`NotificationPlatform`).
//! - Map a note reminder to exactly one scheduled notification per note id.
//! - Provide a SQLite-backed local platform for shells without an OS service.
//!
//! # Invariants
//! - The notification identifier is the owning note's id.
//! - Scheduling for an id replaces any notification already pending for it.
//! - Cancellation is best-effort and never fails the caller.

use crate::db::DbError;
use crate::reminder::trigger::ReminderError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod local;
pub mod platform;
pub mod service;

pub type NotifyResult<T> = Result<T, NotifyError>;

#[derive(Debug)]
pub enum NotifyError {
    /// Permission is still not granted after re-requesting it.
    PermissionDenied,
    Trigger(ReminderError),
    Db(DbError),
    InvalidData(String),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "notification permission denied"),
            Self::Trigger(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid scheduled notification data: {message}")
            }
        }
    }
}

impl Error for NotifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Trigger(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::PermissionDenied | Self::InvalidData(_) => None,
        }
    }
}

impl From<ReminderError> for NotifyError {
    fn from(value: ReminderError) -> Self {
        Self::Trigger(value)
    }
}

impl From<DbError> for NotifyError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for NotifyError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
