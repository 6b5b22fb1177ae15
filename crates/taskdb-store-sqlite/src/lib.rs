//! SQLite-backed storage implementation for taskdb.

mod error;

pub use error::{Result, StoreError};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use taskdb_core::id::TaskId;
use taskdb_core::{ImportSummary, NewTask, Task, UpsertOutcome};
use tracing::{debug, info};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    completed BOOLEAN DEFAULT FALSE
);
";

const SELECT_COLUMNS: &str = "SELECT id, title, description, completed FROM tasks";

/// Storage based on a single `tasks` table in a local SQLite file.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and install the schema.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or SQLite fails to
    /// open the file or create the table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;

        info!(path = %path.display(), "Opened task store");
        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Open a private in-memory database. Nothing is persisted.
    ///
    /// # Errors
    /// Returns an error if SQLite cannot create the table.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, path: None })
    }

    /// Location of the database file, `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert a new pending task and return it with its assigned id.
    ///
    /// # Errors
    /// Returns an error if the insert fails; nothing is written in that case.
    pub fn create(&mut self, task: &NewTask) -> Result<Task> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO tasks (title, description, completed) VALUES (?1, ?2, FALSE)",
            params![task.title(), task.description()],
        )?;
        let id = TaskId(tx.last_insert_rowid());
        tx.commit()?;

        info!(%id, "Created task");
        Ok(Task {
            id,
            title: task.title().to_owned(),
            description: task.description().to_owned(),
            completed: false,
        })
    }

    /// Point lookup by identifier.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no row has this id.
    pub fn get(&self, id: TaskId) -> Result<Task> {
        self.find(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Point lookup that reports absence as `None`.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find(&self, id: TaskId) -> Result<Option<Task>> {
        find_tx(&self.conn, id)
    }

    /// All tasks ordered by id.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_all(&self) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = tasks.len(), "Listed tasks");
        Ok(tasks)
    }

    /// Mark a task completed and return the stored row.
    ///
    /// Completing an already completed task succeeds without changes.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no row has this id.
    pub fn update_completed(&mut self, id: TaskId) -> Result<Task> {
        let tx = self.conn.transaction()?;
        let updated = tx.execute("UPDATE tasks SET completed = TRUE WHERE id = ?1", params![id.get()])?;
        if updated == 0 {
            return Err(StoreError::NotFound(id));
        }
        let task = find_tx(&tx, id)?.ok_or(StoreError::NotFound(id))?;
        tx.commit()?;

        info!(%id, "Completed task");
        Ok(task)
    }

    /// Delete every completed task and return how many rows were removed.
    ///
    /// # Errors
    /// Returns an error if the delete fails; the table is left untouched.
    pub fn delete_completed(&mut self) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM tasks WHERE completed = TRUE", [])?;
        tx.commit()?;

        info!(removed, "Purged completed tasks");
        Ok(removed)
    }

    /// Insert `task` under its own id, or overwrite every field of the
    /// existing row with that id.
    ///
    /// # Errors
    /// Returns an error if the write fails; the row is left untouched.
    pub fn upsert(&mut self, task: &Task) -> Result<UpsertOutcome> {
        let tx = self.conn.transaction()?;
        let outcome = upsert_tx(&tx, task)?;
        tx.commit()?;
        Ok(outcome)
    }

    /// Upsert every record in one transaction.
    ///
    /// Either all records are applied or, on the first failure, none are.
    ///
    /// # Errors
    /// Returns the first error encountered; the transaction is rolled back.
    pub fn upsert_all(&mut self, tasks: &[Task]) -> Result<ImportSummary> {
        let tx = self.conn.transaction()?;
        let mut summary = ImportSummary::default();
        for task in tasks {
            summary.record(upsert_tx(&tx, task)?);
        }
        tx.commit()?;

        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            unchanged = summary.unchanged,
            "Upserted tasks"
        );
        Ok(summary)
    }
}

fn find_tx(conn: &Connection, id: TaskId) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id.get()],
            task_from_row,
        )
        .optional()?;
    Ok(task)
}

fn upsert_tx(tx: &Transaction<'_>, task: &Task) -> Result<UpsertOutcome> {
    let outcome = match find_tx(tx, task.id)? {
        Some(existing) if existing == *task => UpsertOutcome::Unchanged,
        Some(_) => {
            tx.execute(
                "UPDATE tasks SET title = ?2, description = ?3, completed = ?4 WHERE id = ?1",
                params![task.id.get(), task.title, task.description, task.completed],
            )?;
            UpsertOutcome::Updated
        }
        None => {
            tx.execute(
                "INSERT INTO tasks (id, title, description, completed) VALUES (?1, ?2, ?3, ?4)",
                params![task.id.get(), task.title, task.description, task.completed],
            )?;
            UpsertOutcome::Inserted
        }
    };
    debug!(id = %task.id, ?outcome, "Upserted task");
    Ok(outcome)
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        completed: completed_flag(row.get_ref(3)?),
    })
}

/// Rows written by other tools may store the flag as NULL, text or a real.
/// Only values that clearly mean "done" read as completed.
fn completed_flag(value: ValueRef<'_>) -> bool {
    match value {
        ValueRef::Integer(n) => n != 0,
        ValueRef::Real(f) => f != 0.0,
        ValueRef::Text(text) => std::str::from_utf8(text).is_ok_and(|text| {
            let text = text.trim();
            text == "1" || text.eq_ignore_ascii_case("true")
        }),
        ValueRef::Null | ValueRef::Blob(_) => false,
    }
}
