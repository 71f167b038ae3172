//! Task domain model.
//!
//! # Responsibility
//! - Define the statically typed task record shared by store, cache and FFI.
//!
//! # Invariants
//! - Every task is identified by a stable, unique `TaskId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod task;
