//! In-memory task list synchronized with the task store.
//!
//! # Responsibility
//! - Cache the ordered list the screen renders.
//! - Route every user mutation through the store before touching the cache.
//! - Serve case-insensitive title search against the store.
//!
//! # Invariants
//! - The cache changes only after the matching store write succeeded; a
//!   store error leaves the cache exactly as it was.
//! - Toggle and update keep the task at its cached position.
//! - New tasks are prepended, matching the newest-first order.

use crate::model::task::{NewTask, Task, TaskId, TaskPatch};
use crate::repo::task_repo::{RepoError, TaskRepository};
use crate::seed::{ensure_seeded, SeedOutcome, SeedSource};
use crate::service::share::TaskSummary;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ListResult<T> = Result<T, ListError>;

/// Error for list manager operations.
#[derive(Debug)]
pub enum ListError {
    /// Task id is not present in the list or the store.
    NotFound(TaskId),
    /// Title is blank after trimming.
    EmptyTitle,
    /// Store failure; the cache was not modified.
    Repo(RepoError),
}

impl Display for ListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::EmptyTitle => write!(f, "task title must not be blank"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ListError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Ordered task cache backed by a `TaskRepository`.
pub struct TaskListManager<R: TaskRepository> {
    repo: R,
    seed_source: Option<SeedSource>,
    tasks: Vec<Task>,
}

impl<R: TaskRepository> TaskListManager<R> {
    /// Creates a manager with an empty cache. Call `refresh` before reading.
    pub fn new(repo: R) -> Self {
        Self::resume(repo, Vec::new())
    }

    /// Rebuilds a manager around a cache kept by the caller between calls.
    pub fn resume(repo: R, cached: Vec<Task>) -> Self {
        Self {
            repo,
            seed_source: None,
            tasks: cached,
        }
    }

    /// Enables seeding from `source` when `refresh` finds an empty store.
    pub fn with_seed_source(mut self, source: SeedSource) -> Self {
        self.seed_source = Some(source);
        self
    }

    /// Releases the cache so it can be handed to `resume` later.
    pub fn into_cached(self) -> Vec<Task> {
        self.tasks
    }

    /// Currently cached tasks in display order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Cached task by id.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Counts for the list header, computed from the cache.
    pub fn summary(&self) -> TaskSummary {
        TaskSummary::from_tasks(&self.tasks)
    }

    /// Reloads the cache from the store, seeding an empty store first.
    ///
    /// Seeding goes through `ensure_seeded`, so an already seeded database is
    /// never seeded again even when the user deleted every task.
    pub fn refresh(&mut self) -> ListResult<&[Task]> {
        let mut tasks = self.repo.list_tasks().inspect_err(|err| {
            error!("event=list_refresh module=list status=error error={err}");
        })?;

        if tasks.is_empty() {
            if let Some(source) = self.seed_source.as_ref() {
                if let SeedOutcome::Seeded { .. } = ensure_seeded(&self.repo, source)? {
                    tasks = self.repo.list_tasks()?;
                }
            }
        }

        info!("event=list_refresh module=list status=ok count={}", tasks.len());
        self.tasks = tasks;
        Ok(&self.tasks)
    }

    /// Flips the stored `completed` flag of a cached task and returns the
    /// store's read-back, which also replaces the cache entry.
    ///
    /// # Errors
    /// - `NotFound` when `id` is not cached, or the store no longer has it.
    pub fn toggle_completion(&mut self, id: TaskId) -> ListResult<Task> {
        let position = self.position(id).ok_or(ListError::NotFound(id))?;

        let Some(stored) = self.repo.get_task(id)? else {
            return Err(self.drop_stale(position, id));
        };
        let patch = TaskPatch {
            completed: Some(!stored.completed),
            ..TaskPatch::default()
        };
        if !self.repo.update_task(id, &patch)? {
            return Err(self.drop_stale(position, id));
        }
        let Some(toggled) = self.repo.get_task(id)? else {
            return Err(self.drop_stale(position, id));
        };

        self.tasks[position] = toggled.clone();
        debug!(
            "event=task_toggle module=list status=ok task_id={id} completed={}",
            toggled.completed
        );
        Ok(toggled)
    }

    /// Creates a task and places it at the top of the list.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is blank.
    pub fn add(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
    ) -> ListResult<Task> {
        let title = non_blank_title(title.into())?;
        let task = self
            .repo
            .create_task(&NewTask::new(title).with_description(description))?;

        self.tasks.insert(0, task.clone());
        debug!("event=task_add module=list status=ok task_id={}", task.id);
        Ok(task)
    }

    /// Replaces the title and, when given, the description of a task.
    ///
    /// `description: None` keeps the stored description. The cache entry is
    /// replaced in place with the store's read-back.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is blank.
    /// - `NotFound` when the store has no task with `id`.
    pub fn update(
        &mut self,
        id: TaskId,
        title: impl Into<String>,
        description: Option<String>,
    ) -> ListResult<Task> {
        let patch = TaskPatch {
            title: Some(non_blank_title(title.into())?),
            description: description.map(Some),
            completed: None,
        };
        if !self.repo.update_task(id, &patch)? {
            return Err(ListError::NotFound(id));
        }

        let stored = self.repo.get_task(id)?.ok_or(ListError::NotFound(id))?;
        if let Some(position) = self.position(id) {
            self.tasks[position] = stored.clone();
        }
        debug!("event=task_update module=list status=ok task_id={id}");
        Ok(stored)
    }

    /// Deletes a task. Unknown ids are a no-op and return `false`.
    pub fn remove(&mut self, id: TaskId) -> ListResult<bool> {
        let removed = self.repo.delete_task(id)?;
        self.tasks.retain(|task| task.id != id);
        debug!("event=task_remove module=list status=ok task_id={id} removed={removed}");
        Ok(removed > 0)
    }

    /// Filters tasks by title, re-reading the store first.
    ///
    /// Empty `text` yields every task. Matching is a case-insensitive
    /// substring test and keeps the store's newest-first order. The result
    /// becomes the cached list.
    pub fn search(&mut self, text: &str) -> ListResult<&[Task]> {
        let mut tasks = self.repo.list_tasks()?;
        if !text.is_empty() {
            let needle = text.to_lowercase();
            tasks.retain(|task| task.title_contains_folded(&needle));
        }

        debug!(
            "event=task_search module=list status=ok query_chars={} hits={}",
            text.chars().count(),
            tasks.len()
        );
        self.tasks = tasks;
        Ok(&self.tasks)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    /// Evicts a cache entry whose row is gone from the store.
    fn drop_stale(&mut self, position: usize, id: TaskId) -> ListError {
        self.tasks.remove(position);
        debug!("event=task_toggle module=list status=error task_id={id} error_code=stale_cache");
        ListError::NotFound(id)
    }
}

fn non_blank_title(title: String) -> ListResult<String> {
    if title.trim().is_empty() {
        return Err(ListError::EmptyTitle);
    }
    Ok(title)
}
