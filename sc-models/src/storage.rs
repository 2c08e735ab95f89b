//! Durable key-value storage with typed accessors.
//!
//! This table is the app's equivalent of the mobile platform's key-value
//! store: every persisted blob (the partner list snapshot, message
//! preferences, notice gates) lives here under a fixed, versioned key.
//! Values are stored as TEXT; typed accessors handle parsing.

use rusqlite::{params, Connection};

use sc_core::error::{ScError, ScResult};

/// Key-value storage backed by the `storage` table.
pub struct Storage;

impl Storage {
    /// Get a raw string value for a key.
    pub fn get(conn: &Connection, key: &str) -> ScResult<Option<String>> {
        match conn.query_row(
            "SELECT value FROM storage WHERE key = ?1",
            [key],
            |row| row.get::<_, String>(0),
        ) {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ScError::Database(e.to_string())),
        }
    }

    /// Set a raw string value for a key (upsert).
    pub fn set(conn: &Connection, key: &str, value: &str) -> ScResult<()> {
        conn.execute(
            "INSERT INTO storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map_err(|e| ScError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a value by key.
    pub fn delete(conn: &Connection, key: &str) -> ScResult<bool> {
        let changed = conn
            .execute("DELETE FROM storage WHERE key = ?1", [key])
            .map_err(|e| ScError::Database(e.to_string()))?;
        Ok(changed > 0)
    }

    /// Clear all stored values.
    pub fn clear(conn: &Connection) -> ScResult<()> {
        conn.execute("DELETE FROM storage", [])
            .map_err(|e| ScError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Typed accessors ─────────────────────────────────────────────────

    /// Get a boolean value (stored as "true"/"false" or "1"/"0").
    pub fn get_bool(conn: &Connection, key: &str) -> ScResult<Option<bool>> {
        Ok(Self::get(conn, key)?.map(|v| v == "true" || v == "1"))
    }

    /// Set a boolean value.
    pub fn set_bool(conn: &Connection, key: &str, value: bool) -> ScResult<()> {
        Self::set(conn, key, if value { "true" } else { "false" })
    }

    /// Get a JSON-deserialized value.
    pub fn get_json<T: serde::de::DeserializeOwned>(
        conn: &Connection,
        key: &str,
    ) -> ScResult<Option<T>> {
        match Self::get(conn, key)? {
            Some(v) => {
                let parsed = serde_json::from_str(&v).map_err(|e| {
                    ScError::Serialization(format!("failed to parse stored value {key}: {e}"))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a JSON-serialized value.
    pub fn set_json<T: serde::Serialize>(conn: &Connection, key: &str, value: &T) -> ScResult<()> {
        let json =
            serde_json::to_string(value).map_err(|e| ScError::Serialization(e.to_string()))?;
        Self::set(conn, key, &json)
    }
}
