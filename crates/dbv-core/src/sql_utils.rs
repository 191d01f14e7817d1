//! Identifier quoting for the configurable version table name
//!
//! The table name comes from `dbversion.yml`, so it is never interpolated
//! into SQL without going through [`quote_qualified`].

/// Double-quote one identifier, doubling embedded quotes.
///
/// ```
/// use dbv_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("db_version"), r#""db_version""#);
/// assert_eq!(quote_ident(r#"odd"name"#), r#""odd""name""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    let mut quoted = String::with_capacity(ident.len() + 2);
    quoted.push('"');
    for ch in ident.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Quote every `.`-separated component of `name` on its own.
///
/// ```
/// use dbv_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("db_version"), r#""db_version""#);
/// assert_eq!(quote_qualified("ops.db_version"), r#""ops"."db_version""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    let parts: Vec<String> = name.split('.').map(quote_ident).collect();
    parts.join(".")
}

/// `(schema, table)` for a possibly qualified name; bare names are in `main`.
///
/// The last `.` separates the two, so `a.b.c` is table `c` in `a.b`.
///
/// ```
/// use dbv_core::sql_utils::split_qualified_name;
/// assert_eq!(split_qualified_name("db_version"), ("main", "db_version"));
/// assert_eq!(split_qualified_name("ops.db_version"), ("ops", "db_version"));
/// ```
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    name.rsplit_once('.').unwrap_or(("main", name))
}

/// Double single quotes so `value` can sit inside a `'...'` literal.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_with_embedded_quotes() {
        assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
    }

    #[test]
    fn test_quote_ident_keeps_dots() {
        assert_eq!(quote_ident("schema.table"), r#""schema.table""#);
    }

    #[test]
    fn test_quote_qualified_three_parts() {
        assert_eq!(
            quote_qualified("catalog.schema.table"),
            r#""catalog"."schema"."table""#
        );
    }

    #[test]
    fn test_split_qualified_uses_last_dot() {
        assert_eq!(
            split_qualified_name("catalog.schema.table"),
            ("catalog.schema", "table")
        );
    }

    #[test]
    fn test_escape_sql_string() {
        assert_eq!(escape_sql_string("Do not modify!"), "Do not modify!");
        assert_eq!(escape_sql_string("it's"), "it''s");
    }
}
