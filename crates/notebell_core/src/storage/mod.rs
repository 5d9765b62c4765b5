//! Key-value persistence and the whole-list note storage built on top of it.
//!
//! # Responsibility
//! - Define the key-value contract standing in for device local storage.
//! - Persist the note list and reminder settings as single JSON blobs.
//!
//! # Invariants
//! - Every note mutation rewrites the whole list under one key.
//! - Blob writes refuse lists that break `Note` invariants.

use crate::db::DbError;
use crate::model::note::NoteValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod kv_store;
pub mod notes_storage;
pub mod settings_storage;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Blob could not be encoded or decoded.
    Serde {
        key: &'static str,
        source: serde_json::Error,
    },
    Validation(NoteValidationError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serde { key, source } => write!(f, "invalid blob under `{key}`: {source}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serde { source, .. } => Some(source),
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<NoteValidationError> for StorageError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}
