//! Error types for dbv-migrate

use dbv_db::DbError;
use std::io;
use thiserror::Error;

/// Error type returned by migration procedures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a migration run
///
/// Lock contention is not represented here: it is absorbed by the lock
/// manager's retry loop.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Database unreachable or statement rejected (M001)
    #[error("[M001] Database error: {0}")]
    Database(#[from] DbError),

    /// A procedure signaled failure (M002)
    #[error("[M002] Migration procedure #{version} failed: {source}")]
    ProcedureFailed {
        version: u32,
        #[source]
        source: BoxError,
    },

    /// A raw batch could not be applied (M003)
    #[error("[M003] Migration batch #{version} failed: {source}")]
    BatchFailed {
        version: u32,
        #[source]
        source: BatchError,
    },

    /// A raw batch wrote diagnostic output (M004)
    #[error("[M004] Migration batch #{version} produced diagnostic output: {diagnostics}")]
    BatchDiagnostics { version: u32, diagnostics: String },

    /// The singleton version row is missing or unparsable (M005)
    #[error("[M005] Version row in '{table}' is unreadable: {reason}")]
    CorruptVersionRow { table: String, reason: String },

    /// Two procedures registered under one version (M006)
    #[error("[M006] Migration procedure #{version} is already registered")]
    DuplicateProcedure { version: u32 },

    /// A unit or the store panicked while the lock was held (M007)
    #[error("[M007] Migration run panicked: {message}")]
    Panicked { message: String },

    /// Version numbers start at 1 (M008)
    #[error("[M008] Invalid migration version {version}: versions start at 1")]
    InvalidVersion { version: u32 },
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Errors reading the migration source
///
/// The runner treats these as "nothing pending", never as a failed run.
#[derive(Error, Debug)]
pub enum SourceError {
    /// S001: Migration directory could not be listed
    #[error("[S001] Cannot read migration directory {path}: {source}")]
    Unreadable { path: String, source: io::Error },
}

/// Errors applying a raw statement batch
#[derive(Error, Debug)]
pub enum BatchError {
    /// B001: Script file could not be opened or read
    #[error("[B001] Failed to read script {path}: {source}")]
    Read { path: String, source: io::Error },

    /// B002: Client program could not be started
    #[error("[B002] Failed to run '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    /// B003: Client program exited unsuccessfully
    #[error("[B003] '{program}' exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },

    /// B004: Statement batch rejected by the database
    #[error("[B004] {0}")]
    Database(#[from] DbError),
}
