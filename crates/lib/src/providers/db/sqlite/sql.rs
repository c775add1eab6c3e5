//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL query strings for the SQLite provider.
//! This makes the core logic cleaner and isolates database-specific syntax.

/// Lists user tables, skipping SQLite's internal `sqlite_*` bookkeeping tables.
pub const LIST_USER_TABLES: &str = "
    SELECT name
    FROM sqlite_schema
    WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
    ORDER BY name;
";

/// Returns the `PRAGMA` that lists a table's columns in declaration order.
///
/// Columns come back as `cid, name, type, notnull, dflt_value, pk`. The table
/// name is quoted, so keywords and names with spaces are accepted.
pub fn table_info(table_name: &str) -> String {
    format!("PRAGMA table_info({});", quote_identifier(table_name))
}

/// Wraps `name` in double quotes, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_info_quotes_the_table_name() {
        assert_eq!(table_info("order"), "PRAGMA table_info(\"order\");");
        assert_eq!(
            table_info("loan \"payments\""),
            "PRAGMA table_info(\"loan \"\"payments\"\"\");"
        );
    }
}
