//! Command façade sequencing the store, the snapshot codec and the listing.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use taskdb_core::id::TaskId;
use taskdb_core::snapshot::{self, SnapshotError};
use taskdb_core::{ImportSummary, NewTask, Task};
use tempfile::Builder;
use tracing::{debug, info};

use crate::error::CommandError;
use crate::task_store::TaskStore;
use crate::view::{self, StatusLabels, TaskRow};

/// Service façade that sequences store, snapshot codec and listing.
///
/// The service owns its store for the whole session; dropping the service
/// closes the store.
pub struct TaskService<S> {
    store: S,
    labels: StatusLabels,
}

impl<S> TaskService<S> {
    #[must_use]
    pub const fn new(store: S, labels: StatusLabels) -> Self {
        Self { store, labels }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn labels(&self) -> &StatusLabels {
        &self.labels
    }

    /// Release the store, ending the session.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: TaskStore> TaskService<S> {
    /// Validate input and create a pending task.
    ///
    /// # Errors
    /// Returns [`CommandError::Validation`] when a field is empty, leaving the
    /// store unchanged, or [`CommandError::Store`] if the insert fails.
    pub fn add(&mut self, title: &str, description: &str) -> Result<Task, CommandError> {
        let input = NewTask::new(title, description)?;
        let task = self.store.create(&input).map_err(CommandError::store)?;
        info!(id = %task.id, "Added task");
        Ok(task)
    }

    /// Current listing recomputed from the store.
    ///
    /// # Errors
    /// Returns [`CommandError::Store`] if listing fails.
    pub fn list(&self) -> Result<Vec<TaskRow>, CommandError> {
        view::render(&self.store, &self.labels).map_err(CommandError::store)
    }

    /// Look up a single task.
    ///
    /// # Errors
    /// Returns [`CommandError::NotFound`] for unknown ids.
    pub fn show(&self, id: TaskId) -> Result<Task, CommandError> {
        self.store
            .get(id)
            .map_err(CommandError::store)?
            .ok_or(CommandError::NotFound(id))
    }

    /// Mark a task completed.
    ///
    /// # Errors
    /// Returns [`CommandError::NotFound`] for unknown ids.
    pub fn complete(&mut self, id: TaskId) -> Result<Task, CommandError> {
        let task = self
            .store
            .update_completed(id)
            .map_err(CommandError::store)?
            .ok_or(CommandError::NotFound(id))?;
        info!(%id, "Completed task");
        Ok(task)
    }

    /// Delete every completed task and report how many were removed.
    ///
    /// # Errors
    /// Returns [`CommandError::Store`] if the delete fails; no task is removed
    /// in that case.
    pub fn purge_completed(&mut self) -> Result<usize, CommandError> {
        let removed = self.store.delete_completed().map_err(CommandError::store)?;
        info!(removed, "Purged completed tasks");
        Ok(removed)
    }

    /// Write the full task set as a JSON snapshot to `path`.
    ///
    /// The document is written to a temporary file next to `path` and moved
    /// into place, so an existing snapshot is never left half-written.
    ///
    /// # Errors
    /// Returns [`CommandError::Store`] if tasks cannot be listed and
    /// [`CommandError::Io`] if the file cannot be written.
    pub fn export(&self, path: &Path) -> Result<ExportOutput, CommandError> {
        let mut tasks = self.store.list_all().map_err(CommandError::store)?;
        tasks.sort_by_key(|task| task.id);
        let document = snapshot::encode(&tasks).map_err(|err| CommandError::io(path, err.into()))?;

        write_atomically(path, document.as_bytes()).map_err(|err| CommandError::io(path, err))?;

        info!(path = %path.display(), count = tasks.len(), "Exported tasks");
        Ok(ExportOutput {
            path: path.to_path_buf(),
            count: tasks.len(),
        })
    }

    /// Read a snapshot from `path` and upsert every record by id.
    ///
    /// The records are applied as one unit; on any failure the store is left
    /// exactly as it was.
    ///
    /// # Errors
    /// Returns [`CommandError::Io`] if the file cannot be read,
    /// [`CommandError::Format`] or [`CommandError::Schema`] if it cannot be
    /// decoded, and [`CommandError::Store`] if applying the records fails.
    pub fn import(&mut self, path: &Path) -> Result<ImportSummary, CommandError> {
        let document = fs::read_to_string(path).map_err(|err| CommandError::io(path, err))?;
        let tasks = snapshot::decode(&document).map_err(|err| match err {
            SnapshotError::Format(source) => CommandError::Format {
                path: path.to_path_buf(),
                source,
            },
            SnapshotError::Schema(message) => CommandError::Schema {
                path: path.to_path_buf(),
                message,
            },
        })?;
        debug!(path = %path.display(), records = tasks.len(), "Decoded snapshot");

        let summary = self.store.upsert_all(&tasks).map_err(CommandError::store)?;
        info!(
            path = %path.display(),
            inserted = summary.inserted,
            updated = summary.updated,
            unchanged = summary.unchanged,
            "Imported tasks"
        );
        Ok(summary)
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let existing = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => return Err(err),
    };

    let mut builder = Builder::new();
    if existing.is_none() {
        use_plain_file_mode(&mut builder);
    }
    let mut file = builder.tempfile_in(dir)?;
    if let Some(permissions) = existing {
        file.as_file().set_permissions(permissions)?;
    }
    file.write_all(contents)?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// New snapshots get the same mode as `File::create` (0o666 minus umask)
/// instead of the owner-only mode of temporary files.
#[cfg(unix)]
fn use_plain_file_mode(builder: &mut Builder<'_, '_>) {
    use std::os::unix::fs::PermissionsExt;
    builder.permissions(fs::Permissions::from_mode(0o666));
}

#[cfg(not(unix))]
const fn use_plain_file_mode(_builder: &mut Builder<'_, '_>) {}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    /// File that was written.
    pub path: PathBuf,
    /// Number of tasks in the snapshot.
    pub count: usize,
}
