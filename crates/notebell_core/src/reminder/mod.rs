//! Reminder date math.
//!
//! # Responsibility
//! - Compute notification triggers from a due date and time of day.
//! - Classify notes into overdue/today/upcoming buckets.

pub mod buckets;
pub mod trigger;
