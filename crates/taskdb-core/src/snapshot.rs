use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::Task;

/// Errors raised while decoding a snapshot document.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The document is not parseable JSON.
    #[error("snapshot is not valid JSON: {0}")]
    Format(#[source] serde_json::Error),

    /// The document parsed but does not have the expected shape.
    #[error("snapshot schema mismatch: {0}")]
    Schema(String),
}

/// Encode tasks as a pretty-printed JSON array, preserving input order.
///
/// # Errors
/// Returns an error if serialization fails, which cannot happen for plain
/// [`Task`] values but is surfaced instead of panicking.
pub fn encode(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tasks)
}

/// Decode a snapshot document into task records.
///
/// Keys other than `id`, `title`, `description` and `completed` are ignored.
///
/// # Errors
/// Returns [`SnapshotError::Format`] for malformed JSON and
/// [`SnapshotError::Schema`] when the top level is not an array, a record
/// misses a field or carries a wrongly typed one, or two records share an id.
pub fn decode(document: &str) -> Result<Vec<Task>, SnapshotError> {
    let value: Value = serde_json::from_str(document).map_err(SnapshotError::Format)?;
    let records = match value {
        Value::Array(records) => records,
        other => {
            return Err(SnapshotError::Schema(format!(
                "expected a JSON array of tasks, found {}",
                kind_of(&other)
            )));
        }
    };

    let mut seen = HashSet::with_capacity(records.len());
    let mut tasks = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        if !record.is_object() {
            return Err(SnapshotError::Schema(format!(
                "record {index}: expected an object, found {}",
                kind_of(&record)
            )));
        }
        let task: Task = serde_json::from_value(record)
            .map_err(|err| SnapshotError::Schema(format!("record {index}: {err}")))?;
        if !seen.insert(task.id) {
            return Err(SnapshotError::Schema(format!(
                "record {index}: duplicate id {}",
                task.id
            )));
        }
        tasks.push(task);
    }
    Ok(tasks)
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
