//! dbv-db - Database abstraction layer for dbversion
//!
//! This crate provides the `Database` trait the migration core talks to and
//! its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
