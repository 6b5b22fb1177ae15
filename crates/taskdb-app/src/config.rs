use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::view::StatusLabels;

const CONFIG_DIR: &str = ".taskdb";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_DATABASE: &str = "tasks.db";
const DEFAULT_SNAPSHOT: &str = "tasks.json";

/// Top-level project configuration loaded from `.taskdb/config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Database location.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Default snapshot file for export and import.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    /// Listing labels.
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(skip)]
    root: PathBuf,
}

impl ProjectConfig {
    /// Load configuration for the project rooted at `dir`.
    ///
    /// A missing config file yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let root = dir.as_ref().to_path_buf();
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::with_root(root));
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let mut config = Self::from_toml(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config.root = root;
        Ok(config)
    }

    /// Parse and validate configuration text. Paths resolve against the
    /// current directory until a root is attached by [`ProjectConfig::load`].
    ///
    /// # Errors
    /// Returns an error for malformed TOML, empty paths or unusable labels.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration for the project rooted at `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Project directory that relative paths resolve against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolved location of the SQLite database.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.storage.database)
    }

    /// Resolved default location of the JSON snapshot.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.resolve(&self.snapshot.path)
    }

    /// Status labels used by listings.
    #[must_use]
    pub fn status_labels(&self) -> StatusLabels {
        StatusLabels::new(
            self.display.completed_label.clone(),
            self.display.pending_label.clone(),
        )
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.storage.database.as_os_str().is_empty() {
            bail!("storage.database must not be empty");
        }
        if self.snapshot.path.as_os_str().is_empty() {
            bail!("snapshot.path must not be empty");
        }
        self.display.validate()
    }
}

/// `[storage]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database")]
    database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

/// `[snapshot]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot")]
    path: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot(),
        }
    }
}

/// `[display]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_completed_label")]
    completed_label: String,
    #[serde(default = "default_pending_label")]
    pending_label: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            completed_label: default_completed_label(),
            pending_label: default_pending_label(),
        }
    }
}

impl DisplayConfig {
    fn validate(&self) -> Result<()> {
        if self.completed_label.trim().is_empty() || self.pending_label.trim().is_empty() {
            bail!("display labels must not be empty");
        }
        if self.completed_label == self.pending_label {
            bail!(
                "display labels must differ (both are '{}')",
                self.completed_label
            );
        }
        Ok(())
    }
}

fn default_database() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE)
}

fn default_snapshot() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT)
}

fn default_completed_label() -> String {
    StatusLabels::default().label(taskdb_core::TaskStatus::Completed).to_owned()
}

fn default_pending_label() -> String {
    StatusLabels::default().label(taskdb_core::TaskStatus::Pending).to_owned()
}
