//! Task record and write-side request shapes.
//!
//! # Invariants
//! - `id` never changes after creation.
//! - `created_at` is set once and drives the newest-first ordering.
//! - `description: None` and `Some("")` are different values.

/// Stable identifier of a task, derived from its creation time in epoch ms.
pub type TaskId = i64;

/// Owner id stamped on user-created tasks in this single-user app.
pub const DEFAULT_OWNER_ID: i64 = 1;

/// Canonical in-memory task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Kept for compatibility with the seed format.
    pub owner_id: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Task {
    /// Returns whether `needle` occurs in the title, ignoring case.
    ///
    /// `needle` must already be lowercased by the caller so repeated matches
    /// over a list do not re-fold the query.
    pub fn title_contains_folded(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
    }
}

/// Input for a user-initiated task creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

impl NewTask {
    /// Creates an incomplete task request with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: false,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Partial update of a stored task.
///
/// Fields left as `None` keep their stored value. For `description`,
/// `Some(None)` clears the value and `Some(Some(text))` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Returns `true` when the patch carries no field to write.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Applies the patch to an in-memory task.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}
