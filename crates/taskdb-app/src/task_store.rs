//! Storage abstraction consumed by [`TaskService`](crate::service::TaskService).

use anyhow::Error;
use taskdb_core::id::TaskId;
use taskdb_core::{ImportSummary, NewTask, Task, UpsertOutcome};
use taskdb_store_sqlite::{SqliteStore, StoreError};

/// Minimal storage abstraction required by the command façade.
///
/// Absence is reported through `Option` so that stores only surface genuine
/// failures through [`TaskStore::Error`].
pub trait TaskStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Persist a new pending task and return it with its assigned id.
    ///
    /// # Errors
    /// Returns a store-specific error when the insert fails.
    fn create(&mut self, task: &NewTask) -> Result<Task, Self::Error>;

    /// Load a single task.
    ///
    /// # Errors
    /// Returns a store-specific error when the lookup fails.
    fn get(&self, id: TaskId) -> Result<Option<Task>, Self::Error>;

    /// Load every task. Order is not significant.
    ///
    /// # Errors
    /// Returns a store-specific error when listing fails.
    fn list_all(&self) -> Result<Vec<Task>, Self::Error>;

    /// Mark a task completed, returning `None` when it does not exist.
    ///
    /// # Errors
    /// Returns a store-specific error when the update fails.
    fn update_completed(&mut self, id: TaskId) -> Result<Option<Task>, Self::Error>;

    /// Delete all completed tasks atomically and return how many were removed.
    ///
    /// # Errors
    /// Returns a store-specific error when the delete fails. No row may be
    /// removed in that case.
    fn delete_completed(&mut self) -> Result<usize, Self::Error>;

    /// Insert or overwrite a single record keyed by its id.
    ///
    /// # Errors
    /// Returns a store-specific error when the write fails.
    fn upsert(&mut self, task: &Task) -> Result<UpsertOutcome, Self::Error>;

    /// Upsert a batch as one unit: all records are applied or none are.
    ///
    /// # Errors
    /// Returns a store-specific error when any record fails.
    fn upsert_all(&mut self, tasks: &[Task]) -> Result<ImportSummary, Self::Error>;
}

impl TaskStore for SqliteStore {
    type Error = StoreError;

    fn create(&mut self, task: &NewTask) -> Result<Task, Self::Error> {
        Self::create(self, task)
    }

    fn get(&self, id: TaskId) -> Result<Option<Task>, Self::Error> {
        Self::find(self, id)
    }

    fn list_all(&self) -> Result<Vec<Task>, Self::Error> {
        Self::list_all(self)
    }

    fn update_completed(&mut self, id: TaskId) -> Result<Option<Task>, Self::Error> {
        match Self::update_completed(self, id) {
            Ok(task) => Ok(Some(task)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn delete_completed(&mut self) -> Result<usize, Self::Error> {
        Self::delete_completed(self)
    }

    fn upsert(&mut self, task: &Task) -> Result<UpsertOutcome, Self::Error> {
        Self::upsert(self, task)
    }

    fn upsert_all(&mut self, tasks: &[Task]) -> Result<ImportSummary, Self::Error> {
        Self::upsert_all(self, tasks)
    }
}

impl<S> TaskStore for &mut S
where
    S: TaskStore + ?Sized,
{
    type Error = S::Error;

    fn create(&mut self, task: &NewTask) -> Result<Task, Self::Error> {
        (**self).create(task)
    }

    fn get(&self, id: TaskId) -> Result<Option<Task>, Self::Error> {
        (**self).get(id)
    }

    fn list_all(&self) -> Result<Vec<Task>, Self::Error> {
        (**self).list_all()
    }

    fn update_completed(&mut self, id: TaskId) -> Result<Option<Task>, Self::Error> {
        (**self).update_completed(id)
    }

    fn delete_completed(&mut self) -> Result<usize, Self::Error> {
        (**self).delete_completed()
    }

    fn upsert(&mut self, task: &Task) -> Result<UpsertOutcome, Self::Error> {
        (**self).upsert(task)
    }

    fn upsert_all(&mut self, tasks: &[Task]) -> Result<ImportSummary, Self::Error> {
        (**self).upsert_all(tasks)
    }
}
