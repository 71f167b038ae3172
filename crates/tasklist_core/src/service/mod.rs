//! Core use-case services.
//!
//! # Responsibility
//! - Keep the cached task list in step with the task store.
//! - Shape task data for the presentation layer (counts, share text).
//! - Keep UI/FFI layers decoupled from storage details.

pub mod share;
pub mod task_list;
