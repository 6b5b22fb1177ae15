//! Application layer logic for taskdb.
//!
//! This crate provides the command façade, the listing projection, the store
//! abstraction and configuration shared by every taskdb shell.

pub mod config;
pub mod error;
pub mod service;
pub mod task_store;
pub mod view;

// Re-exports for convenience
pub use config::ProjectConfig;
pub use error::{CommandError, ErrorKind};
pub use service::{ExportOutput, TaskService};
pub use task_store::TaskStore;
pub use view::{StatusLabels, TaskRow, render};
