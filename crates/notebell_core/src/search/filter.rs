//! In-memory note list filtering.
//!
//! # Invariants
//! - Matching is a case-insensitive substring test on title or content.
//! - The query is used as given; only `""` matches every note.
//! - All helpers preserve input order.

use crate::model::note::{Note, Priority};

/// Notes split by completion flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteSections {
    pub pending: Vec<Note>,
    pub completed: Vec<Note>,
}

/// Notes grouped by priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityGroups {
    pub high: Vec<Note>,
    pub medium: Vec<Note>,
    pub low: Vec<Note>,
}

pub fn matches_query(note: &Note, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    note.title.to_lowercase().contains(&needle) || note.content.to_lowercase().contains(&needle)
}

pub fn search(notes: &[Note], query: &str) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| matches_query(note, query))
        .cloned()
        .collect()
}

pub fn split_by_completion(notes: Vec<Note>) -> NoteSections {
    let (completed, pending) = notes.into_iter().partition(|note| note.completed);
    NoteSections { pending, completed }
}

pub fn group_by_priority(notes: Vec<Note>) -> PriorityGroups {
    let mut groups = PriorityGroups::default();
    for note in notes {
        match note.priority {
            Priority::High => groups.high.push(note),
            Priority::Medium => groups.medium.push(note),
            Priority::Low => groups.low.push(note),
        }
    }
    groups
}
