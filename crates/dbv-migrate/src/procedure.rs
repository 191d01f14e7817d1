//! Executable migration procedures
//!
//! A procedure is migration logic written in Rust, for changes the raw SQL
//! dialect cannot express. The future returned by [`Procedure::run`] is the
//! completion signal: the runner waits for it before touching the version row.

use crate::error::{BoxError, MigrateError, MigrateResult, SourceError};
use crate::source::ScriptSource;
use crate::unit::MigrationUnit;
use async_trait::async_trait;
use dbv_db::Database;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One executable migration step
#[async_trait]
pub trait Procedure: Send + Sync {
    /// Apply the migration against the main connection
    async fn run(&self, db: &dyn Database) -> Result<(), BoxError>;
}

/// Adapter turning a closure into a [`Procedure`]
///
/// ```rust
/// use dbv_migrate::ProcedureFn;
/// use futures::FutureExt;
///
/// let backfill = ProcedureFn::new(|db| {
///     async move {
///         db.execute("UPDATE users SET active = true").await?;
///         Ok::<(), dbv_migrate::BoxError>(())
///     }
///     .boxed()
/// });
/// # let _ = backfill;
/// ```
pub struct ProcedureFn<F>(F);

impl<F> ProcedureFn<F>
where
    F: for<'a> Fn(&'a dyn Database) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Procedure for ProcedureFn<F>
where
    F: for<'a> Fn(&'a dyn Database) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync,
{
    async fn run(&self, db: &dyn Database) -> Result<(), BoxError> {
        (self.0)(db).await
    }
}

/// Procedures registered in-process, keyed by version
#[derive(Clone, Default)]
pub struct ProcedureRegistry {
    procedures: BTreeMap<u32, Arc<dyn Procedure>>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `procedure` as migration `version`
    pub fn register(
        &mut self,
        version: u32,
        procedure: impl Procedure + 'static,
    ) -> MigrateResult<()> {
        if version == 0 {
            return Err(MigrateError::InvalidVersion { version });
        }
        if self.procedures.contains_key(&version) {
            return Err(MigrateError::DuplicateProcedure { version });
        }
        self.procedures.insert(version, Arc::new(procedure));
        Ok(())
    }

    /// Register a closure as migration `version`
    pub fn register_fn<F>(&mut self, version: u32, f: F) -> MigrateResult<()>
    where
        F: for<'a> Fn(&'a dyn Database) -> BoxFuture<'a, Result<(), BoxError>>
            + Send
            + Sync
            + 'static,
    {
        self.register(version, ProcedureFn::new(f))
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// All registered procedures as migration units, ascending
    pub fn units(&self) -> Vec<MigrationUnit> {
        self.procedures
            .iter()
            .map(|(version, procedure)| MigrationUnit::procedure(*version, procedure.clone()))
            .collect()
    }
}

#[async_trait]
impl ScriptSource for ProcedureRegistry {
    async fn list(&self) -> Result<Vec<MigrationUnit>, SourceError> {
        Ok(self.units())
    }

    fn describe(&self) -> String {
        format!("{} registered procedure(s)", self.len())
    }
}
