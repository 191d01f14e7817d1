//! Ordered application of pending migration units

use crate::batch::BatchRunner;
use crate::error::{MigrateError, MigrateResult};
use crate::source::ScriptSource;
use crate::store::VersionStore;
use crate::unit::{select_unit, MigrationUnit, UnitKind};
use dbv_db::Database;

/// Applies units `start, start + 1, ...` until a number has no unit
///
/// The caller must hold the version row lock for the whole call.
pub struct Runner<'a> {
    db: &'a dyn Database,
    source: &'a dyn ScriptSource,
    batch: &'a dyn BatchRunner,
    store: &'a dyn VersionStore,
}

impl<'a> Runner<'a> {
    pub fn new(
        db: &'a dyn Database,
        source: &'a dyn ScriptSource,
        batch: &'a dyn BatchRunner,
        store: &'a dyn VersionStore,
    ) -> Self {
        Self {
            db,
            source,
            batch,
            store,
        }
    }

    /// Run every contiguous unit from `start` and return the applied versions
    ///
    /// The version row is updated after each unit, so a failure leaves it at
    /// the last unit that completed.
    pub async fn run_from(&self, start: u32) -> MigrateResult<Vec<u32>> {
        let mut applied = Vec::new();
        let mut next = Some(start);

        while let Some(version) = next {
            let listing = match self.source.list().await {
                Ok(listing) => listing,
                Err(e) => {
                    log::warn!(
                        "{}; treating {} as having no pending migrations",
                        e,
                        self.source.describe()
                    );
                    break;
                }
            };

            let Some(unit) = select_unit(&listing, version) else {
                log::debug!("No migration #{} in {}", version, self.source.describe());
                break;
            };

            log::info!("Found migration #{}, running it", version);
            self.apply(unit).await?;
            self.store.record_version(version).await?;
            log::info!("Ran migration {}", unit.identifier());

            applied.push(version);
            next = version.checked_add(1);
        }

        Ok(applied)
    }

    async fn apply(&self, unit: &MigrationUnit) -> MigrateResult<()> {
        let version = unit.version;
        match &unit.kind {
            UnitKind::Procedure(procedure) => procedure
                .run(self.db)
                .await
                .map_err(|source| MigrateError::ProcedureFailed { version, source }),
            UnitKind::Batch(path) => {
                let diagnostics = self
                    .batch
                    .run_batch(path)
                    .await
                    .map_err(|source| MigrateError::BatchFailed { version, source })?;
                if diagnostics.is_empty() {
                    Ok(())
                } else {
                    Err(MigrateError::BatchDiagnostics {
                        version,
                        diagnostics: diagnostics.trim().to_string(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
