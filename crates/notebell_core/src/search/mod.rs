//! Search and grouping over the loaded note list.
//!
//! # Responsibility
//! - Keep list shaping (search, completion split, priority groups) in core.

pub mod filter;
