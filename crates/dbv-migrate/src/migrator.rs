//! Single entry point: bootstrap, lock, run, release

use crate::batch::BatchRunner;
use crate::error::{MigrateError, MigrateResult};
use crate::lock::{self, DEFAULT_POLL_INTERVAL};
use crate::runner::Runner;
use crate::source::ScriptSource;
use crate::store::{SqlVersionStore, VersionStatus, VersionStore};
use crate::unit::contiguous_from;
use dbv_core::TableName;
use dbv_db::Database;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a successful run
///
/// A stop at a version gap looks the same as being up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    pub applied: Vec<u32>,
}

impl MigrationReport {
    pub fn is_up_to_date(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Brings a database to the latest contiguous migration version
pub struct Migrator {
    db: Arc<dyn Database>,
    source: Arc<dyn ScriptSource>,
    batch: Arc<dyn BatchRunner>,
    store: Arc<dyn VersionStore>,
    poll_interval: Duration,
}

impl Migrator {
    /// Migrator tracking its version in the default `db_version` table
    pub fn new(
        db: Arc<dyn Database>,
        source: Arc<dyn ScriptSource>,
        batch: Arc<dyn BatchRunner>,
    ) -> Self {
        let store = Arc::new(SqlVersionStore::new(db.clone(), TableName::default()));
        Self {
            db,
            source,
            batch,
            store,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Track the version in `table` on the same database
    pub fn with_table(mut self, table: TableName) -> Self {
        self.store = Arc::new(SqlVersionStore::new(self.db.clone(), table));
        self
    }

    /// Replace the version store entirely
    pub fn with_store(mut self, store: Arc<dyn VersionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Apply every pending migration.
    ///
    /// Waits for any concurrent run to finish first. The lock is released on
    /// every exit path once acquired, including a panic inside a migration
    /// unit, which is reported as [`MigrateError::Panicked`].
    pub async fn migrate(&self) -> MigrateResult<MigrationReport> {
        log::debug!(
            "Migrating {} database from {}",
            self.db.db_type(),
            self.source.describe()
        );
        self.store.ensure_table().await?;
        lock::acquire(self.store.as_ref(), self.poll_interval).await?;

        let outcome = AssertUnwindSafe(self.run_locked())
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(MigrateError::Panicked {
                    message: panic_message(panic.as_ref()),
                })
            });

        let released = self.store.release().await;
        match (outcome, released) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(release_err)) => {
                log::error!("Failed to release migration lock: {}", release_err);
                Err(e)
            }
        }
    }

    async fn run_locked(&self) -> MigrateResult<MigrationReport> {
        let from_version = self.store.current_version().await?;
        log::info!("Current database version is {}", from_version);

        let Some(start) = from_version.checked_add(1) else {
            return Ok(MigrationReport {
                from_version,
                to_version: from_version,
                applied: Vec::new(),
            });
        };

        let runner = Runner::new(
            self.db.as_ref(),
            self.source.as_ref(),
            self.batch.as_ref(),
            self.store.as_ref(),
        );
        let applied = runner.run_from(start).await?;
        let to_version = applied.last().copied().unwrap_or(from_version);

        if applied.is_empty() {
            log::info!("Database is up to date at version {}", to_version);
        } else {
            log::info!(
                "Applied {} migration(s), database is now at version {}",
                applied.len(),
                to_version
            );
        }

        Ok(MigrationReport {
            from_version,
            to_version,
            applied,
        })
    }

    /// Current version and lock flag, without taking the lock
    pub async fn status(&self) -> MigrateResult<VersionStatus> {
        self.store.ensure_table().await?;
        self.store.status().await
    }

    /// Versions the next run would apply, given the current listing
    ///
    /// Nothing is executed. An unreadable source yields an empty list, the
    /// same way a run treats it.
    pub async fn pending(&self) -> MigrateResult<Vec<u32>> {
        let current = self.status().await?.version;
        let Some(start) = current.checked_add(1) else {
            return Ok(Vec::new());
        };
        match self.source.list().await {
            Ok(listing) => Ok(contiguous_from(&listing, start)),
            Err(e) => {
                log::warn!("{}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Clear the lock flag regardless of who set it
    ///
    /// Only for recovering from a run that was killed while holding the lock.
    pub async fn force_unlock(&self) -> MigrateResult<()> {
        self.store.ensure_table().await?;
        self.store.release().await
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
