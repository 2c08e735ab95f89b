//! Database schema definitions and table creation.
//!
//! The schema is deliberately small: one key-value table holding every
//! persisted blob (the partner list snapshot, message preferences, one-time
//! notice gates), plus schema version tracking.

use rusqlite::Connection;
use tracing::info;

use sc_core::error::{ScError, ScResult};

/// Create all database tables if they do not exist.
pub fn create_tables(conn: &Connection) -> ScResult<()> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| ScError::Database(format!("failed to create schema: {e}")))?;
    info!("database schema verified");
    Ok(())
}

/// Drop all tables (used for database reset).
pub fn drop_tables(conn: &Connection) -> ScResult<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS storage;
         DROP TABLE IF EXISTS schema_version;",
    )
    .map_err(|e| ScError::Database(format!("failed to drop tables: {e}")))?;
    Ok(())
}

/// Complete SQL schema.
const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

-- Durable key-value storage
CREATE TABLE IF NOT EXISTS storage (
    key     TEXT PRIMARY KEY,
    value   TEXT NOT NULL
);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_drop_and_recreate() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn.execute("INSERT INTO storage (key, value) VALUES ('a', '1')", [])
            .unwrap();
        drop_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM storage", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
