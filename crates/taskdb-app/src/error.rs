//! Error taxonomy surfaced by [`TaskService`](crate::service::TaskService).

use std::io;
use std::path::PathBuf;

use taskdb_core::ValidationError;
use taskdb_core::id::TaskId;

/// Failure of a single façade command.
///
/// Every variant is terminal for the command that produced it. Mutations
/// that fail are rolled back before the error is returned.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// A required field was empty.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The command referenced an identifier that does not exist.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The snapshot file is not parseable JSON.
    #[error("{} is not valid JSON: {source}", path.display())]
    Format {
        /// Snapshot file that was read.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot parsed but a record is missing or mistypes a field.
    #[error("{} does not match the task schema: {message}", path.display())]
    Schema {
        /// Snapshot file that was read.
        path: PathBuf,
        /// Description naming the offending record.
        message: String,
    },

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[source] anyhow::Error),

    /// Reading or writing the snapshot file failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// Snapshot file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of a [`CommandError`], used by shells to pick exit
/// codes and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`CommandError::Validation`].
    Validation,
    /// See [`CommandError::NotFound`].
    NotFound,
    /// See [`CommandError::Format`].
    Format,
    /// See [`CommandError::Schema`].
    Schema,
    /// See [`CommandError::Store`].
    Store,
    /// See [`CommandError::Io`].
    Io,
}

impl CommandError {
    /// Classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Format { .. } => ErrorKind::Format,
            Self::Schema { .. } => ErrorKind::Schema,
            Self::Store(_) => ErrorKind::Store,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn store(err: impl Into<anyhow::Error>) -> Self {
        Self::Store(err.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    #[test]
    fn validation_error_keeps_field_name() {
        let err = CommandError::from(ValidationError::EmptyField("title"));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "invalid input: title must not be empty");
    }

    #[test]
    fn io_error_mentions_path() {
        let err = CommandError::io(
            "/tmp/missing.json",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("/tmp/missing.json"));
    }
}
