//! Presentable task listing recomputed from the store on every call.

use serde::Serialize;
use taskdb_core::id::TaskId;
use taskdb_core::{Task, TaskStatus};

use crate::task_store::TaskStore;

/// Display labels for the two task statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLabels {
    completed: String,
    pending: String,
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            completed: TaskStatus::Completed.label().to_owned(),
            pending: TaskStatus::Pending.label().to_owned(),
        }
    }
}

impl StatusLabels {
    /// Build labels from explicit strings.
    #[must_use]
    pub fn new(completed: impl Into<String>, pending: impl Into<String>) -> Self {
        Self {
            completed: completed.into(),
            pending: pending.into(),
        }
    }

    /// Label shown for `status`.
    #[must_use]
    pub fn label(&self, status: TaskStatus) -> &str {
        match status {
            TaskStatus::Completed => &self.completed,
            TaskStatus::Pending => &self.pending,
        }
    }
}

/// One row of the rendered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    /// Task identifier.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Derived status.
    pub status: TaskStatus,
    /// Display label for `status`.
    pub status_label: String,
}

impl TaskRow {
    fn from_task(task: Task, labels: &StatusLabels) -> Self {
        let status = task.status();
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status,
            status_label: labels.label(status).to_owned(),
        }
    }
}

/// Pull every task from `store` and project it into rows ordered by id.
///
/// # Errors
/// Returns the store error if listing fails.
pub fn render<S: TaskStore>(store: &S, labels: &StatusLabels) -> Result<Vec<TaskRow>, S::Error> {
    let mut tasks = store.list_all()?;
    tasks.sort_by_key(|task| task.id);
    Ok(tasks
        .into_iter()
        .map(|task| TaskRow::from_task(task, labels))
        .collect())
}
