//! Key-value persistence backend
//!
//! The store persists whole collections: one encoded blob per key, written
//! synchronously on every mutation. Anything that can hold bytes under a
//! string key qualifies, so the backend sits behind a small trait.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::storage::error::StorageResult;
use crate::storage::schema::{init_schema, needs_init};

/// Key the encoded note collection is stored under
pub const NOTES_KEY: &str = "notes";
/// Key the encoded folder collection is stored under
pub const FOLDERS_KEY: &str = "folders";
/// Key for the persisted note-list sort preference
pub const SORT_OPTIONS_KEY: &str = "sort_options";
/// Key for the persisted archive-view sort preference
pub const ARCHIVED_SORT_OPTIONS_KEY: &str = "archived_sort_options";

/// Byte storage under string keys
pub trait KvStore: Send {
    /// Store bytes under a key, replacing any previous value
    fn save(&mut self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Fetch the bytes stored under a key, `None` if absent
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;
}

/// SQLite-backed key-value store
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    /// Open or create the database at the given path
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                crate::storage::error::StorageError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                }
            })?;
        }

        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        if needs_init(&conn) {
            init_schema(&conn)?;
        }
        Ok(Self { conn })
    }
}

impl KvStore for SqliteKv {
    fn save(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }
}
