//! Interactive numbered menu over stdin/stdout.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Result;
use taskdb_app::{TaskService, TaskStore};
use taskdb_core::id::TaskId;

use crate::commands::{describe_import, write_task_table};

const MENU: &str = "
--- Task Manager ---
1. Add task
2. List tasks
3. Mark task as completed
4. Delete completed tasks
5. Export tasks
6. Import tasks
7. Quit
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Add,
    List,
    Complete,
    Purge,
    Export,
    Import,
    Quit,
}

impl Choice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Add),
            "2" => Some(Self::List),
            "3" => Some(Self::Complete),
            "4" => Some(Self::Purge),
            "5" => Some(Self::Export),
            "6" => Some(Self::Import),
            "7" | "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Run the menu loop until the user quits or input ends.
///
/// Command failures are reported on `output` and the loop continues; only
/// I/O errors on the terminal itself end the session with an error.
pub fn run<S, R, W>(service: &mut TaskService<S>, snapshot_path: &Path, mut input: R, mut output: W) -> Result<()>
where
    S: TaskStore,
    R: BufRead,
    W: Write,
{
    show_listing(service, &mut output)?;

    loop {
        write!(output, "{MENU}\nSelect an option: ")?;
        output.flush()?;
        let Some(line) = read_line(&mut input)? else {
            writeln!(output)?;
            break;
        };

        match Choice::parse(&line) {
            Some(Choice::Add) => {
                let title = prompt(&mut input, &mut output, "Title: ")?.unwrap_or_default();
                let description = prompt(&mut input, &mut output, "Description: ")?.unwrap_or_default();
                match service.add(&title, &description) {
                    Ok(task) => writeln!(output, "\nTask {} added.", task.id)?,
                    Err(err) => writeln!(output, "\nError: {err}")?,
                }
            }
            Some(Choice::List) => show_listing(service, &mut output)?,
            Some(Choice::Complete) => {
                let raw = prompt(&mut input, &mut output, "Task id to complete: ")?.unwrap_or_default();
                match raw.parse::<TaskId>() {
                    Ok(id) => match service.complete(id) {
                        Ok(task) => writeln!(output, "\nTask {} marked as completed.", task.id)?,
                        Err(err) => writeln!(output, "\nError: {err}")?,
                    },
                    Err(_) => writeln!(output, "\nInvalid task id: {}", raw.trim())?,
                }
            }
            Some(Choice::Purge) => match service.purge_completed() {
                Ok(removed) => writeln!(output, "\nRemoved {removed} completed task(s).")?,
                Err(err) => writeln!(output, "\nError: {err}")?,
            },
            Some(Choice::Export) => match service.export(snapshot_path) {
                Ok(done) => writeln!(
                    output,
                    "\nExported {} task(s) to {}.",
                    done.count,
                    done.path.display()
                )?,
                Err(err) => writeln!(output, "\nError: {err}")?,
            },
            Some(Choice::Import) => match service.import(snapshot_path) {
                Ok(summary) => writeln!(output, "\n{}", describe_import(&summary, snapshot_path))?,
                Err(err) => writeln!(output, "\nError: {err}")?,
            },
            Some(Choice::Quit) => {
                writeln!(output, "\nBye.")?;
                break;
            }
            None => writeln!(output, "\nUnknown option, try again.")?,
        }
    }

    output.flush()?;
    Ok(())
}

fn show_listing<S: TaskStore, W: Write>(service: &TaskService<S>, output: &mut W) -> Result<()> {
    match service.list() {
        Ok(rows) => write_task_table(output, &rows),
        Err(err) => {
            writeln!(output, "Error: {err}")?;
            Ok(())
        }
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<Option<String>> {
    write!(output, "{label}")?;
    output.flush()?;
    read_line(input)
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}
