//! Flutter-facing bridge for NoteBell core.

pub mod api;
