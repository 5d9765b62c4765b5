//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate storage and notification calls into use-case level APIs.
//! - Keep UI/FFI/CLI layers decoupled from storage details.

pub mod note_service;
