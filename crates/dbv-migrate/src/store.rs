//! Version table bootstrap, lock flag, and version row access
//!
//! The version table holds exactly one row, `(id = 1, version, running)`.
//! `version` is the highest fully applied migration and `running` is the
//! cross-process mutual exclusion flag.

use crate::error::{MigrateError, MigrateResult};
use async_trait::async_trait;
use dbv_core::sql_utils::{escape_sql_string, quote_qualified, split_qualified_name};
use dbv_core::TableName;
use dbv_db::Database;
use std::sync::Arc;

/// Self-documenting comment attached to the version table
pub const TABLE_COMMENT: &str = "Used for automatic database versioning. Do not modify!";

/// Column layout written by releases that predate the `id` key column
const LEGACY_COLUMNS: [&str; 2] = ["version", "running"];

/// Snapshot of the version row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionStatus {
    pub version: u32,
    pub running: bool,
}

/// Storage primitive behind a migration run
///
/// `try_acquire` must be a single atomic conditional update: it returns
/// `true` only for the caller that flipped the flag from clear to set.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Create the table in its current shape, upgrade a legacy shape, and
    /// seed the singleton row without overwriting an existing one
    async fn ensure_table(&self) -> MigrateResult<()>;

    /// Set the lock flag if it is clear
    async fn try_acquire(&self) -> MigrateResult<bool>;

    /// Clear the lock flag unconditionally
    async fn release(&self) -> MigrateResult<()>;

    /// Highest applied migration, 0 when none
    async fn current_version(&self) -> MigrateResult<u32>;

    /// Persist `version` as fully applied
    async fn record_version(&self, version: u32) -> MigrateResult<()>;

    /// Current version and lock flag, read without taking the lock
    async fn status(&self) -> MigrateResult<VersionStatus>;
}

/// [`VersionStore`] backed by a table on the migrated database itself
pub struct SqlVersionStore {
    db: Arc<dyn Database>,
    table: TableName,
    quoted: String,
}

impl SqlVersionStore {
    pub fn new(db: Arc<dyn Database>, table: TableName) -> Self {
        let quoted = quote_qualified(&table);
        Self { db, table, quoted }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    async fn create_schema_if_qualified(&self) -> MigrateResult<()> {
        if !self.table.contains('.') {
            return Ok(());
        }
        let (schema, _) = split_qualified_name(&self.table);
        self.db
            .execute(&format!(
                "CREATE SCHEMA IF NOT EXISTS {}",
                quote_qualified(schema)
            ))
            .await?;
        Ok(())
    }

    /// Add the `id` key to a table that only has `(version, running)`.
    async fn upgrade_legacy_shape(&self) -> MigrateResult<()> {
        let columns = self.db.get_table_schema(&self.table).await?;
        let is_legacy = columns.len() == LEGACY_COLUMNS.len()
            && columns
                .iter()
                .zip(LEGACY_COLUMNS)
                .all(|((name, _), expected)| name == expected);
        if !is_legacy {
            return Ok(());
        }

        log::info!(
            "Upgrading legacy version table {} with an id key column",
            self.table
        );
        let table = &self.quoted;
        self.db
            .execute(&format!(
                "ALTER TABLE {table} ADD COLUMN id UTINYINT DEFAULT 1"
            ))
            .await?;
        self.db
            .execute(&format!("ALTER TABLE {table} ADD PRIMARY KEY (id)"))
            .await?;
        Ok(())
    }

    async fn read_column(&self, column: &str) -> MigrateResult<String> {
        let sql = format!("SELECT {column} FROM {} WHERE id = 1", self.quoted);
        self.db
            .query_one(&sql)
            .await?
            .ok_or_else(|| self.corrupt(format!("no row with id = 1 (reading {column})")))
    }

    fn corrupt(&self, reason: String) -> MigrateError {
        MigrateError::CorruptVersionRow {
            table: self.table.to_string(),
            reason,
        }
    }
}

#[async_trait]
impl VersionStore for SqlVersionStore {
    async fn ensure_table(&self) -> MigrateResult<()> {
        self.create_schema_if_qualified().await?;

        let table = &self.quoted;
        self.db
            .execute(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (\
                 id UTINYINT NOT NULL DEFAULT 1, \
                 version UINTEGER NOT NULL DEFAULT 0, \
                 running UTINYINT NOT NULL DEFAULT 0, \
                 PRIMARY KEY (id))"
            ))
            .await?;
        self.db
            .execute(&format!(
                "COMMENT ON TABLE {table} IS '{}'",
                escape_sql_string(TABLE_COMMENT)
            ))
            .await?;

        self.upgrade_legacy_shape().await?;

        // Columns are named: the legacy upgrade appends `id` last.
        self.db
            .execute(&format!(
                "INSERT INTO {table} (id, version, running) VALUES (1, 0, 0) ON CONFLICT DO NOTHING"
            ))
            .await?;
        Ok(())
    }

    async fn try_acquire(&self) -> MigrateResult<bool> {
        let changed = self
            .db
            .execute(&format!(
                "UPDATE {} SET running = 1 WHERE id = 1 AND running = 0",
                self.quoted
            ))
            .await?;
        Ok(changed > 0)
    }

    async fn release(&self) -> MigrateResult<()> {
        self.db
            .execute(&format!(
                "UPDATE {} SET running = 0 WHERE id = 1",
                self.quoted
            ))
            .await?;
        Ok(())
    }

    async fn current_version(&self) -> MigrateResult<u32> {
        let raw = self.read_column("version").await?;
        raw.trim()
            .parse()
            .map_err(|e| self.corrupt(format!("version '{raw}' is not an unsigned integer: {e}")))
    }

    async fn record_version(&self, version: u32) -> MigrateResult<()> {
        self.db
            .execute(&format!(
                "UPDATE {} SET version = {version} WHERE id = 1",
                self.quoted
            ))
            .await?;
        Ok(())
    }

    async fn status(&self) -> MigrateResult<VersionStatus> {
        let version = self.current_version().await?;
        let raw = self.read_column("running").await?;
        let running: u8 = raw
            .trim()
            .parse()
            .map_err(|e| self.corrupt(format!("running flag '{raw}' is not numeric: {e}")))?;
        Ok(VersionStatus {
            version,
            running: running != 0,
        })
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
