//! # SQLite Specific SQL Queries
//!
//! This module centralizes the catalog queries used by the SQLite provider.
//! This keeps database-specific syntax out of the introspection logic.

/// Lists user tables, ordered by name.
pub const LIST_TABLES_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name;";

/// Fetches the `CREATE TABLE` statement of a table. Expects the table name as `?1`.
pub const TABLE_DEFINITION_SQL: &str =
    "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1;";

/// Returns the `PRAGMA table_info` statement for a table.
///
/// PRAGMA arguments cannot be bound, so the name is emitted as a quoted
/// identifier with embedded quotes doubled.
pub fn table_info(table_name: &str) -> String {
    format!("PRAGMA table_info({});", quote_identifier(table_name))
}

/// Quotes an identifier for safe inclusion in a statement.
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
