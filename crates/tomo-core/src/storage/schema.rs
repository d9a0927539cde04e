//! SQLite schema for the key-value store
//!
//! The store persists each collection as a single encoded blob under a fixed
//! key, so the schema is deliberately tiny: one kv table plus version
//! tracking for migrations.

use rusqlite::{Connection, OptionalExtension, Result};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Encoded collections and preferences, one blob per key
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value BLOB NOT NULL
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Check whether the schema still needs to be created
pub fn needs_init(conn: &Connection) -> bool {
    let version: Option<String> = conn
        .query_row(
            "SELECT value FROM schema_info WHERE key = 'version'",
            [],
            |row| row.get(0),
        )
        .optional()
        .unwrap_or(None);

    version.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(needs_init(&conn));

        init_schema(&conn).unwrap();
        assert!(!needs_init(&conn));

        // Idempotent
        init_schema(&conn).unwrap();
    }
}
