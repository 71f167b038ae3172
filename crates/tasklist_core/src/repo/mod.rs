//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the task store contract used by seeding and the list manager.
//! - Keep SQLite query details out of service orchestration.
//!
//! # Invariants
//! - Write failures are returned to the caller, never swallowed.
//! - Read paths reject rows that cannot be mapped to `Task`.

pub mod task_repo;
