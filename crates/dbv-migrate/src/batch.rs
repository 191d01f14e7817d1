//! Raw statement batch runners
//!
//! The orchestrator only sees the [`BatchRunner`] capability. The runner
//! decides how a `.sql` file reaches the database; what comes back is the
//! diagnostic output, and any non-empty diagnostic output fails the migration.

use crate::error::BatchError;
use async_trait::async_trait;
use dbv_db::Database;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

/// Applies one raw statement batch
#[async_trait]
pub trait BatchRunner: Send + Sync {
    /// Apply `script` and return whatever diagnostic output was produced
    async fn run_batch(&self, script: &Path) -> Result<String, BatchError>;
}

/// Pipes the script into an external command-line client
///
/// The client gets the same target the main connection uses (configured via
/// its arguments), so very large or dialect-specific scripts bypass the
/// driver's statement parser. Standard error is the diagnostic channel.
#[derive(Debug, Clone)]
pub struct CommandBatchRunner {
    program: String,
    args: Vec<String>,
}

impl CommandBatchRunner {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl BatchRunner for CommandBatchRunner {
    async fn run_batch(&self, script: &Path) -> Result<String, BatchError> {
        let input = tokio::fs::File::open(script)
            .await
            .map_err(|e| BatchError::Read {
                path: script.display().to_string(),
                source: e,
            })?
            .into_std()
            .await;

        log::debug!("Running {} {:?} < {}", self.program, self.args, script.display());
        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::from(input))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| BatchError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(BatchError::Exit {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr,
            });
        }
        Ok(stderr)
    }
}

/// Executes the script through the main connection
///
/// There is no separate diagnostic channel; a rejected statement is an error.
pub struct ConnectionBatchRunner {
    db: Arc<dyn Database>,
}

impl ConnectionBatchRunner {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BatchRunner for ConnectionBatchRunner {
    async fn run_batch(&self, script: &Path) -> Result<String, BatchError> {
        let sql = tokio::fs::read_to_string(script)
            .await
            .map_err(|e| BatchError::Read {
                path: script.display().to_string(),
                source: e,
            })?;
        self.db.execute_batch(&sql).await?;
        Ok(String::new())
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
