//! Error types for dbv-db

use thiserror::Error;

/// Errors from the database collaborator
#[derive(Error, Debug)]
pub enum DbError {
    /// D001: database file could not be opened
    #[error("[D001] Cannot open database: {0}")]
    ConnectionError(String),

    /// D002: statement rejected
    #[error("[D002] Statement failed: {0}")]
    ExecutionError(String),

    /// D003: statement referenced a relation that does not exist
    #[error("[D003] Relation does not exist: {0}")]
    TableNotFound(String),

    /// D006: a thread panicked while holding the connection
    #[error("[D006] Connection lock poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // Only the message distinguishes a missing relation.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
