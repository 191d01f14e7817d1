//! Configuration types and parsing for dbversion.yml

use crate::error::{CoreError, CoreResult};
use crate::table_name::TableName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file names searched by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["dbversion.yml", "dbversion.yaml"];

const MEMORY_DB_PATH: &str = ":memory:";

/// Main configuration from dbversion.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Table that tracks the current schema version
    #[serde(default)]
    pub table_name: TableName,

    /// Directory containing numbered migration scripts
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Lock acquisition settings
    #[serde(default)]
    pub lock: LockConfig,

    /// How raw `.sql` batches are applied
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (DuckDB file or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Lock acquisition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockConfig {
    /// Delay between attempts while another process holds the lock
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl LockConfig {
    /// Poll interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Batch runner selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BatchRunnerKind {
    /// Execute the script through the main database connection (default)
    #[default]
    Connection,
    /// Pipe the script into an external command-line client
    Command,
}

/// Batch runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Which runner applies `.sql` files
    #[serde(default)]
    pub runner: BatchRunnerKind,

    /// Client program for the `command` runner (e.g. `duckdb`)
    #[serde(default)]
    pub program: Option<String>,

    /// Arguments for the client program, passed through unchanged
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_migrations_path() -> String {
    "dbmigration".to_string()
}

fn default_db_path() -> String {
    MEMORY_DB_PATH.to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: TableName::default(),
            migrations_path: default_migrations_path(),
            database: DatabaseConfig::default(),
            lock: LockConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for dbversion.yml or dbversion.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.migrations_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_path cannot be empty".to_string(),
            });
        }

        if self.lock.poll_interval_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "lock.poll_interval_ms must be greater than zero".to_string(),
            });
        }

        if self.batch.runner == BatchRunnerKind::Command
            && self.batch.program.as_deref().is_none_or(|p| p.trim().is_empty())
        {
            return Err(CoreError::ConfigInvalid {
                message: "batch.program is required when batch.runner is 'command'".to_string(),
            });
        }

        Ok(())
    }

    /// Get absolute migrations path relative to a project root
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_path)
    }

    /// Whether the database lives only in memory
    pub fn is_in_memory(&self) -> bool {
        self.database.path == MEMORY_DB_PATH
    }

    /// Get the database path relative to a project root.
    ///
    /// `:memory:` is returned unchanged.
    pub fn database_path_absolute(&self, root: &Path) -> String {
        if self.is_in_memory() {
            return self.database.path.clone();
        }
        root.join(&self.database.path).display().to_string()
    }

    /// Check that the `command` batch runner can reach a database the
    /// migrator is not holding open.
    ///
    /// DuckDB allows a single read-write process per file, and an in-memory
    /// database is invisible to a child process, so a client pointed at the
    /// migrator's own database can never apply a script.
    pub fn validate_batch_target(&self, root: &Path) -> CoreResult<()> {
        if self.batch.runner != BatchRunnerKind::Command {
            return Ok(());
        }

        if self.is_in_memory() {
            return Err(CoreError::ConfigInvalid {
                message: "batch.runner 'command' cannot reach an in-memory database; \
                          use batch.runner 'connection'"
                    .to_string(),
            });
        }

        let database = self.database_path_absolute(root);
        let database = Path::new(&database);
        if let Some(arg) = self
            .batch
            .args
            .iter()
            .find(|arg| root.join(arg).components().eq(database.components()))
        {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "batch.args '{}' is the database file the migrator holds open; \
                     a second process cannot open it, use batch.runner 'connection'",
                    arg
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
