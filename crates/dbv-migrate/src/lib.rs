//! dbv-migrate - Schema-version orchestrator for dbversion
//!
//! Brings a database to the latest known schema version by applying numbered
//! migration units exactly once each, in ascending order. Concurrent runs
//! against the same database are serialized through a flag on the version
//! row itself.
//!
//! A run is strictly linear: bootstrap the version table, take the lock, read
//! the current version, apply `current + 1`, `current + 2`, ... until a number
//! has no unit, then release the lock.
//!
//! ```rust,no_run
//! use dbv_db::{Database, DuckDbBackend};
//! use dbv_migrate::{ConnectionBatchRunner, DirectorySource, Migrator};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db: Arc<dyn Database> = Arc::new(DuckDbBackend::new("app.duckdb")?);
//! let source = Arc::new(DirectorySource::new("dbmigration"));
//! let batch = Arc::new(ConnectionBatchRunner::new(db.clone()));
//!
//! let report = Migrator::new(db, source, batch).migrate().await?;
//! println!("schema at version {}", report.to_version);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod error;
pub mod lock;
pub mod migrator;
pub mod procedure;
pub mod runner;
pub mod source;
pub mod store;
pub mod unit;

pub use batch::{BatchRunner, CommandBatchRunner, ConnectionBatchRunner};
pub use error::{BatchError, BoxError, MigrateError, MigrateResult, SourceError};
pub use lock::DEFAULT_POLL_INTERVAL;
pub use migrator::{MigrationReport, Migrator};
pub use procedure::{Procedure, ProcedureFn, ProcedureRegistry};
pub use runner::Runner;
pub use source::{DirectorySource, ScriptSource};
pub use store::{SqlVersionStore, VersionStatus, VersionStore};
pub use unit::{MigrationUnit, UnitKind};
