//! CLI entry point for taskdb.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use taskdb_app::{CommandError, ErrorKind, ProjectConfig, TaskService};
use taskdb_core::id::TaskId;
use taskdb_store_sqlite::SqliteStore;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;
mod menu;

/// Personal task list stored in a local SQLite file.
#[derive(Parser, Debug)]
#[command(
    name = "taskdb",
    version,
    about = "taskdb: personal tasks in a local SQLite table, with JSON export/import"
)]
struct Cli {
    /// Project directory holding `.taskdb/config.toml` (defaults to current).
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Database file, overriding the configured location.
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new pending task.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },

    /// List tasks with their status.
    Ls {
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Show a single task as JSON.
    Show { id: TaskId },

    /// Mark a task as completed.
    Done { id: TaskId },

    /// Delete every completed task.
    Purge,

    /// Write all tasks to a JSON snapshot.
    Export {
        /// Destination file (defaults to the configured snapshot path).
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Upsert tasks from a JSON snapshot, keyed by id.
    Import {
        /// Source file (defaults to the configured snapshot path).
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Interactive numbered menu.
    Menu,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum LsFormat {
    Table,
    Json,
}

fn main() -> ExitCode {
    let Cli { dir, db, cmd } = Cli::parse();

    install_tracing(default_log_level(&cmd));

    match execute_command(dir, db, cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn execute_command(dir: Option<PathBuf>, db: Option<PathBuf>, command: Command) -> Result<()> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let config = ProjectConfig::load(&dir)?;
    let db_path = db.unwrap_or_else(|| config.database_path());
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open task store at {}", db_path.display()))?;
    let mut service = TaskService::new(store, config.status_labels());
    let snapshot_path = config.snapshot_path();
    debug!(db = %db_path.display(), snapshot = %snapshot_path.display(), "Opened task store");

    match command {
        Command::Menu => {
            let stdin = io::stdin();
            menu::run(&mut service, &snapshot_path, stdin.lock(), io::stdout().lock())
        }
        other => commands::run(other, &mut service, &snapshot_path, &mut io::stdout().lock()),
    }
}

const fn default_log_level(cmd: &Command) -> &'static str {
    if matches!(cmd, Command::Menu) { "warn" } else { "info" }
}

fn install_tracing(default_level: &str) {
    // RUST_LOG overrides the default level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<CommandError>().map(CommandError::kind) {
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::Format | ErrorKind::Schema) => 4,
        Some(ErrorKind::Io) => 5,
        Some(ErrorKind::Store) => 6,
        None => 1,
    }
}
