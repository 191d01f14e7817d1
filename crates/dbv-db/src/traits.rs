//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Database abstraction trait for dbversion
///
/// Implementations must be Send + Sync so one connection can be shared by
/// concurrent migration runs.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single SQL statement, returns the number of rows changed
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Return the first column of the first row as text, `None` when the
    /// query yields no rows or the value is NULL
    async fn query_one(&self, sql: &str) -> DbResult<Option<String>>;

    /// Ordered `(column_name, data_type)` pairs of a table
    ///
    /// Returns an empty list when the table does not exist.
    async fn get_table_schema(&self, table: &str) -> DbResult<Vec<(String, String)>>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
