//! Core persistence and list-synchronization logic for the to-do list app.
//! This crate is the single source of truth for task invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{NewTask, Task, TaskId, TaskPatch, DEFAULT_OWNER_ID};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use seed::{
    ensure_seeded, load_seed, parse_seed, SeedError, SeedOutcome, SeedRecord, SeedSource,
};
pub use service::share::{format_task_date, share_text, TaskSummary};
pub use service::task_list::{ListError, ListResult, TaskListManager};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
