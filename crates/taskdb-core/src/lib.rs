//! Domain types & snapshot codec for taskdb.

/// Identifier types.
pub mod id;
/// JSON snapshot encoding and decoding.
pub mod snapshot;

use crate::id::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single to-do record as persisted in the store and in snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier of the task.
    pub id: TaskId,
    /// Short human-readable title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Whether the task has been completed.
    pub completed: bool,
}

impl Task {
    /// Derived display status of the task.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        TaskStatus::from_completed(self.completed)
    }
}

/// Input accepted by the store when creating a task.
///
/// Construction validates that both fields carry text, so a `NewTask` never
/// holds an empty title or description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: String,
}

impl NewTask {
    /// Validate and build a new task payload.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyField`] when the title or description is
    /// empty or whitespace only.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Result<Self, ValidationError> {
        let title = title.into();
        let description = description.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }
        if description.trim().is_empty() {
            return Err(ValidationError::EmptyField("description"));
        }
        Ok(Self { title, description })
    }

    /// Validated title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Validated description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Rejected user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field was empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// What an upsert did to the row keyed by the record's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row had this id; a new row was inserted with it.
    Inserted,
    /// An existing row was overwritten with different values.
    Updated,
    /// The existing row already matched the record.
    Unchanged,
}

/// Per-outcome counts for a batch of upserts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records inserted under their snapshot id.
    pub inserted: usize,
    /// Records that overwrote an existing row.
    pub updated: usize,
    /// Records identical to the stored row.
    pub unchanged: usize,
}

impl ImportSummary {
    /// Count one upsert outcome.
    pub const fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }

    /// Total number of records processed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }

    /// Whether the batch changed any stored row.
    #[must_use]
    pub const fn changed_anything(&self) -> bool {
        self.inserted + self.updated > 0
    }
}

/// Two-valued display status derived from [`Task::completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not completed yet.
    Pending,
    /// Marked as completed.
    Completed,
}

impl TaskStatus {
    /// Map the persisted flag to a status.
    #[must_use]
    pub const fn from_completed(completed: bool) -> Self {
        if completed { Self::Completed } else { Self::Pending }
    }

    /// Default English label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
