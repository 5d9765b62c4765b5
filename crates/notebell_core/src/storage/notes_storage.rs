//! Whole-list note persistence.
//!
//! # Responsibility
//! - Load, overwrite and clear the note list blob under `NOTES_KEY`.
//!
//! # Invariants
//! - `get_notes` is fail-soft: read/decode failures log and yield `[]`.
//! - `load_notes` propagates failures so mutation paths never overwrite a
//!   blob they could not read.
//! - `save_notes` rejects duplicate ids and invalid notes before writing.

use crate::model::note::{Note, NoteValidationError};
use crate::storage::kv_store::KeyValueStore;
use crate::storage::{StorageError, StorageResult};
use log::{error, info};
use std::collections::HashSet;
use std::time::Instant;

/// Storage key holding the serialized note list.
pub const NOTES_KEY: &str = "@notes_storage";

pub struct NotesStorage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> NotesStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the stored list, or an empty list when it cannot be read.
    pub fn get_notes(&self) -> Vec<Note> {
        match self.load_notes() {
            Ok(notes) => notes,
            Err(err) => {
                error!(
                    "event=notes_load module=storage status=error error_code=notes_read_failed error={err}"
                );
                Vec::new()
            }
        }
    }

    /// Returns the stored list; absent key means an empty list.
    pub fn load_notes(&self) -> StorageResult<Vec<Note>> {
        let Some(raw) = self.store.get_item(NOTES_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| StorageError::Serde {
            key: NOTES_KEY,
            source,
        })
    }

    /// Overwrites the stored list.
    pub fn save_notes(&self, notes: &[Note]) -> StorageResult<()> {
        let started_at = Instant::now();
        let result = validate_list(notes)
            .map_err(StorageError::from)
            .and_then(|()| {
                serde_json::to_string(notes).map_err(|source| StorageError::Serde {
                    key: NOTES_KEY,
                    source,
                })
            })
            .and_then(|blob| self.store.set_item(NOTES_KEY, &blob));

        match &result {
            Ok(()) => info!(
                "event=notes_save module=storage status=ok count={} duration_ms={}",
                notes.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=notes_save module=storage status=error count={} error={err}",
                notes.len()
            ),
        }
        result
    }

    /// Removes the stored list entirely.
    pub fn clear_all_notes(&self) -> StorageResult<()> {
        match self.store.remove_item(NOTES_KEY) {
            Ok(()) => {
                info!("event=notes_clear module=storage status=ok");
                Ok(())
            }
            Err(err) => {
                error!("event=notes_clear module=storage status=error error={err}");
                Err(err)
            }
        }
    }
}

fn validate_list(notes: &[Note]) -> Result<(), NoteValidationError> {
    let mut seen = HashSet::with_capacity(notes.len());
    for note in notes {
        note.validate()?;
        if !seen.insert(note.id.as_str()) {
            return Err(NoteValidationError::DuplicateId(note.id.clone()));
        }
    }
    Ok(())
}
