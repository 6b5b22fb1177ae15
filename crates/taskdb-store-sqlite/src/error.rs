//! Error types for taskdb store operations.

use taskdb_core::id::TaskId;
use thiserror::Error;

/// Errors that can occur during `SqliteStore` operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No row exists for the requested identifier.
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    /// SQLite reported an error (connection, constraint, I/O inside the engine).
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Preparing the database location failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
