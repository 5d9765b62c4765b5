//! Domain model for notes and reminder preferences.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the serialized shape stable for the stored note list blob.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion removes the note from the list; there are no tombstones.

pub mod note;
pub mod settings;
