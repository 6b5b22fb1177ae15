use std::io::Write;
use std::path::Path;

use anyhow::{Result, bail};
use taskdb_app::{TaskRow, TaskService, TaskStore};
use taskdb_core::ImportSummary;

use crate::{Command, LsFormat};

pub fn run<S: TaskStore>(
    command: Command,
    service: &mut TaskService<S>,
    snapshot_path: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Add { title, description } => {
            let task = service.add(&title, &description)?;
            writeln!(out, "created task: {}", task.id)?;
        }
        Command::Ls { format } => {
            let rows = service.list()?;
            match format {
                LsFormat::Table => write_task_table(out, &rows)?,
                LsFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?,
            }
        }
        Command::Show { id } => {
            let task = service.show(id)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&task)?)?;
        }
        Command::Done { id } => {
            let task = service.complete(id)?;
            writeln!(out, "completed task: {}", task.id)?;
        }
        Command::Purge => {
            let removed = service.purge_completed()?;
            writeln!(out, "removed {removed} completed task(s)")?;
        }
        Command::Export { path } => {
            let path = path.as_deref().unwrap_or(snapshot_path);
            let output = service.export(path)?;
            writeln!(out, "exported {} task(s) to {}", output.count, output.path.display())?;
        }
        Command::Import { path } => {
            let path = path.as_deref().unwrap_or(snapshot_path);
            let summary = service.import(path)?;
            writeln!(out, "{}", describe_import(&summary, path))?;
        }
        Command::Menu => bail!("the menu runs as an interactive session, not a one-shot command"),
    }

    Ok(())
}

/// Print the listing as a pipe-separated table.
pub fn write_task_table(out: &mut dyn Write, rows: &[TaskRow]) -> Result<()> {
    if rows.is_empty() {
        writeln!(out, "No tasks found")?;
        return Ok(());
    }

    writeln!(out, "ID | Title | Description | Status")?;
    writeln!(out, "-- | ----- | ----------- | ------")?;
    for row in rows {
        writeln!(
            out,
            "{} | {} | {} | {}",
            row.id, row.title, row.description, row.status_label
        )?;
    }
    Ok(())
}

pub fn describe_import(summary: &ImportSummary, path: &Path) -> String {
    if summary.total() == 0 {
        return format!("{} contained no tasks", path.display());
    }
    format!(
        "imported {} task(s) from {} ({} new, {} updated, {} unchanged)",
        summary.total(),
        path.display(),
        summary.inserted,
        summary.updated,
        summary.unchanged
    )
}
