//! Storage layer
//!
//! Two backends sit behind traits so the store never touches the
//! filesystem or SQLite directly:
//!
//! - **KvStore**: whole-collection persistence, one encoded blob per key
//! - **BlobStore**: image bytes, scoped by owning note id

pub mod blobs;
pub mod error;
pub mod kv;
pub mod schema;

pub use blobs::{BlobStore, FsBlobStore};
pub use error::{StorageError, StorageResult};
pub use kv::{
    KvStore, SqliteKv, ARCHIVED_SORT_OPTIONS_KEY, FOLDERS_KEY, NOTES_KEY, SORT_OPTIONS_KEY,
};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
