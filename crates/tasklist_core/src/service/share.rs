//! Read-only task projections for the list header and share sheet.

use crate::model::task::Task;
use chrono::{DateTime, Utc};

const SHARE_DATE_FORMAT: &str = "%d/%m/%y";

/// Task counts shown above the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskSummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
        }
    }
}

/// Formats a task creation time as `dd/MM/yy` in UTC.
///
/// Out-of-range timestamps render as an empty string.
pub fn format_task_date(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|date| date.format(SHARE_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Plain-text summary handed to the platform share sheet.
pub fn share_text(task: &Task) -> String {
    let status = if task.completed {
        "Completed"
    } else {
        "Not completed"
    };
    format!(
        "Task: {}\nStatus: {status}\nDate: {}",
        task.title,
        format_task_date(task.created_at)
    )
}
