//! Migration units and the `<integer>.<ext>` naming contract

use crate::procedure::Procedure;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// File extension of raw statement batches
pub const BATCH_EXTENSION: &str = "sql";

/// Extension used when rendering a registered procedure's identifier
pub const PROCEDURE_EXTENSION: &str = "proc";

/// How a migration unit is executed
#[derive(Clone)]
pub enum UnitKind {
    /// Rust logic run in-process
    Procedure(Arc<dyn Procedure>),
    /// A `.sql` file handed to the batch runner
    Batch(PathBuf),
}

impl fmt::Debug for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Procedure(_) => f.write_str("Procedure"),
            UnitKind::Batch(path) => f.debug_tuple("Batch").field(path).finish(),
        }
    }
}

/// One numbered migration step. Identity is the version number alone.
#[derive(Debug, Clone)]
pub struct MigrationUnit {
    pub version: u32,
    pub kind: UnitKind,
}

impl MigrationUnit {
    pub fn procedure(version: u32, procedure: Arc<dyn Procedure>) -> Self {
        Self {
            version,
            kind: UnitKind::Procedure(procedure),
        }
    }

    pub fn batch(version: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            version,
            kind: UnitKind::Batch(path.into()),
        }
    }

    pub fn is_procedure(&self) -> bool {
        matches!(self.kind, UnitKind::Procedure(_))
    }

    /// `<n>.sql` or `<n>.proc`
    pub fn identifier(&self) -> String {
        let ext = match self.kind {
            UnitKind::Procedure(_) => PROCEDURE_EXTENSION,
            UnitKind::Batch(_) => BATCH_EXTENSION,
        };
        format!("{}.{}", self.version, ext)
    }
}

/// Split a file name into `(version, extension)`.
///
/// Only the canonical decimal form is accepted: `"7.sql"` parses, while
/// `"07.sql"`, `"+7.sql"`, `"0.sql"` and `"7.up.sql"` do not.
pub fn parse_file_name(name: &str) -> Option<(u32, &str)> {
    let (stem, ext) = name.split_once('.')?;
    if ext.is_empty() || ext.contains('.') {
        return None;
    }
    let version: u32 = stem.parse().ok()?;
    if version == 0 || stem != version.to_string() {
        return None;
    }
    Some((version, ext))
}

/// Find the unit for `version`, preferring a procedure over a batch.
pub fn select_unit(listing: &[MigrationUnit], version: u32) -> Option<&MigrationUnit> {
    let mut candidates = listing.iter().filter(|unit| unit.version == version);
    let first = candidates.next()?;
    if first.is_procedure() {
        return Some(first);
    }
    Some(candidates.find(|unit| unit.is_procedure()).unwrap_or(first))
}

/// Versions that would run from `start`: the contiguous run present in
/// `listing`, stopping at the first missing number.
pub fn contiguous_from(listing: &[MigrationUnit], start: u32) -> Vec<u32> {
    let mut versions = Vec::new();
    let mut next = Some(start);
    while let Some(version) = next {
        if select_unit(listing, version).is_none() {
            break;
        }
        versions.push(version);
        next = version.checked_add(1);
    }
    versions
}
