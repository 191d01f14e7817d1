//! dbv-core - Core library for dbversion
//!
//! This crate provides the configuration file format, the shared error type,
//! and the identifier helpers used by every other dbversion crate.

pub mod config;
pub mod error;
pub mod sql_utils;
pub mod table_name;

pub use config::{BatchConfig, BatchRunnerKind, Config, DatabaseConfig, LockConfig};
pub use error::{CoreError, CoreResult};
pub use table_name::TableName;
