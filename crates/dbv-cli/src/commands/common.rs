//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use dbv_core::{BatchRunnerKind, Config};
use dbv_db::{Database, DuckDbBackend};
use dbv_migrate::{
    BatchRunner, CommandBatchRunner, ConnectionBatchRunner, DirectorySource, Migrator,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Loaded configuration plus the directory its relative paths resolve against
pub(crate) struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_path_absolute(&self.root)
    }

    pub fn database_path(&self) -> String {
        self.config.database_path_absolute(&self.root)
    }

    /// Open the configured database
    pub fn open_database(&self) -> Result<Arc<DuckDbBackend>> {
        let path = self.database_path();
        if self.config.is_in_memory() {
            log::warn!("Database path is :memory:, migrations will not persist");
        }
        let db = DuckDbBackend::new(&path)
            .with_context(|| format!("Failed to open database at {}", path))?;
        Ok(Arc::new(db))
    }

    /// Build the migrator over `db` from the project configuration
    pub fn migrator(&self, db: Arc<DuckDbBackend>) -> Migrator {
        let source = DirectorySource::new(self.migrations_dir());
        let batch: Arc<dyn BatchRunner> = match self.config.batch.runner {
            BatchRunnerKind::Connection => Arc::new(ConnectionBatchRunner::new(db.clone())),
            BatchRunnerKind::Command => {
                // validate() guarantees a program for the command runner
                let program = self.config.batch.program.clone().unwrap_or_default();
                Arc::new(CommandBatchRunner::new(
                    program,
                    self.config.batch.args.clone(),
                ))
            }
        };

        let db: Arc<dyn Database> = db;
        Migrator::new(db, Arc::new(source), batch)
            .with_table(self.config.table_name.clone())
            .with_poll_interval(self.config.lock.poll_interval())
    }
}

/// Load the project from global arguments
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = Path::new(&global.project_dir).to_path_buf();
    let mut config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project configuration")?;

    if let Some(database) = &global.database {
        log::debug!("Database path overridden with {}", database);
        config.database.path = database.clone();
    }
    config
        .validate_batch_target(&root)
        .context("Invalid batch runner configuration")?;

    Ok(Project { root, config })
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
