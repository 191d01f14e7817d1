//! Strongly-typed version table name.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Table used when no name is configured.
pub const DEFAULT_TABLE_NAME: &str = "db_version";

/// Name of the table that tracks the schema version (possibly schema-qualified
/// like "ops.db_version").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Create a new `TableName`, panicking in debug builds on invalid input.
    ///
    /// Prefer [`try_new`](Self::try_new) when handling untrusted input.
    pub fn new(name: impl Into<String>) -> Self {
        let s = name.into();
        debug_assert!(validate(&s).is_ok(), "invalid TableName: {s:?}");
        Self(s)
    }

    /// Try to create a new `TableName`.
    ///
    /// Rejects empty names and names with an empty component (`"ops."`,
    /// `".db_version"`, `"a..b"`).
    pub fn try_new(name: impl Into<String>) -> CoreResult<Self> {
        let s = name.into();
        validate(&s)?;
        Ok(Self(s))
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate(name: &str) -> CoreResult<()> {
    if name.is_empty() {
        return Err(CoreError::InvalidTableName {
            name: name.to_string(),
            reason: "name cannot be empty".to_string(),
        });
    }
    if name.split('.').any(str::is_empty) {
        return Err(CoreError::InvalidTableName {
            name: name.to_string(),
            reason: "qualified name has an empty component".to_string(),
        });
    }
    Ok(())
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE_NAME.to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for TableName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TableName {
    type Error = CoreError;

    fn try_from(s: String) -> CoreResult<Self> {
        Self::try_new(s)
    }
}

impl From<TableName> for String {
    fn from(name: TableName) -> Self {
        name.0
    }
}

impl PartialEq<str> for TableName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TableName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_name() {
        assert_eq!(TableName::default(), "db_version");
    }

    #[test]
    fn test_schema_qualified_is_accepted() {
        let name = TableName::try_new("ops.db_version").unwrap();
        assert_eq!(name.as_str(), "ops.db_version");
        assert!(name.starts_with("ops."));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            TableName::try_new(""),
            Err(CoreError::InvalidTableName { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_component() {
        assert!(TableName::try_new("ops.").is_err());
        assert!(TableName::try_new(".db_version").is_err());
        assert!(TableName::try_new("a..b").is_err());
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let name = TableName::new("db_version");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, r#""db_version""#);
        let back: TableName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);

        assert!(serde_json::from_str::<TableName>(r#""""#).is_err());
    }
}
