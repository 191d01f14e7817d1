//! Migration unit discovery

use crate::error::SourceError;
use crate::procedure::ProcedureRegistry;
use crate::unit::{parse_file_name, MigrationUnit, BATCH_EXTENSION};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Enumerates the migration units currently available
///
/// The runner relists before every step, so implementations must not cache.
#[async_trait]
pub trait ScriptSource: Send + Sync {
    /// All units currently available, in any order
    async fn list(&self) -> Result<Vec<MigrationUnit>, SourceError>;

    /// Human-readable location for log messages
    fn describe(&self) -> String;
}

/// `<n>.sql` files in a directory, plus any registered procedures
pub struct DirectorySource {
    path: PathBuf,
    procedures: ProcedureRegistry,
}

impl DirectorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            procedures: ProcedureRegistry::default(),
        }
    }

    /// Merge in-process procedures into every listing
    pub fn with_procedures(mut self, procedures: ProcedureRegistry) -> Self {
        self.procedures = procedures;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_batches(&self) -> std::io::Result<Vec<MigrationUnit>> {
        let mut units = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            match parse_file_name(name) {
                Some((version, BATCH_EXTENSION)) => {
                    if entry.file_type().await?.is_dir() {
                        log::debug!("Skipping directory {}", entry.path().display());
                        continue;
                    }
                    units.push(MigrationUnit::batch(version, entry.path()));
                }
                _ => log::debug!("Ignoring non-migration file {}", name),
            }
        }

        Ok(units)
    }
}

#[async_trait]
impl ScriptSource for DirectorySource {
    async fn list(&self) -> Result<Vec<MigrationUnit>, SourceError> {
        let mut units = self
            .read_batches()
            .await
            .map_err(|e| SourceError::Unreadable {
                path: self.path.display().to_string(),
                source: e,
            })?;
        units.extend(self.procedures.units());
        units.sort_by_key(|unit| unit.version);
        Ok(units)
    }

    fn describe(&self) -> String {
        if self.procedures.is_empty() {
            self.path.display().to_string()
        } else {
            format!(
                "{} (+{} registered procedure(s))",
                self.path.display(),
                self.procedures.len()
            )
        }
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
