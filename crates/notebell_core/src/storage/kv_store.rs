//! Key-value store contract and SQLite implementation.
//!
//! # Invariants
//! - Each call is atomic on its own; there are no multi-key transactions.
//! - `set_item` overwrites any previous value for the key.
//! - `remove_item` on a missing key is a no-op.

use crate::storage::StorageResult;
use rusqlite::{params, Connection, OptionalExtension};

/// String-to-string store standing in for device local storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
    /// Lists stored keys in ascending order.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// SQLite-backed key-value store over the `kv_store` table.
#[derive(Debug, Clone, Copy)]
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    /// Wraps a migrated connection (see `db::open_db`).
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_store ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get(0)?);
        }
        Ok(keys)
    }
}
