//! Image blob storage
//!
//! Image bytes live outside the database, keyed by owning note id (the
//! scope) and filename. The filesystem implementation keeps one directory
//! per note under `<data_dir>/images/` and uses atomic writes (write to a
//! temp file, then rename) so a blob is never left half-written.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::storage::error::{StorageError, StorageResult};

/// Content-addressable storage for note attachments
///
/// `scope` is the owning note's id; `key` is the attachment filename.
pub trait BlobStore: Send {
    /// Write bytes under `scope/key`, replacing any previous blob
    fn put(&mut self, scope: Uuid, key: &str, bytes: &[u8]) -> StorageResult<()>;

    /// Read the blob at `scope/key`, `None` if absent
    fn get(&self, scope: Uuid, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Remove the blob at `scope/key`; removing a missing blob is a no-op
    fn delete(&mut self, scope: Uuid, key: &str) -> StorageResult<()>;

    /// Remove every blob in the scope; a missing scope is a no-op
    fn delete_scope(&mut self, scope: Uuid) -> StorageResult<()>;
}

/// Filesystem-backed blob store
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a blob store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn scope_dir(&self, scope: Uuid) -> PathBuf {
        self.root.join(scope.to_string())
    }

    fn blob_path(&self, scope: Uuid, key: &str) -> PathBuf {
        self.scope_dir(scope).join(key)
    }
}

impl BlobStore for FsBlobStore {
    fn put(&mut self, scope: Uuid, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let path = self.blob_path(scope, key);
        atomic_write(&path, bytes)
    }

    fn get(&self, scope: Uuid, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.blob_path(scope, key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|e| StorageError::ReadError {
            path: path.clone(),
            source: e,
        })?;
        Ok(Some(bytes))
    }

    fn delete(&mut self, scope: Uuid, key: &str) -> StorageResult<()> {
        let path = self.blob_path(scope, key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| StorageError::from_io(e, path.clone()))?;
        }
        Ok(())
    }

    fn delete_scope(&mut self, scope: Uuid) -> StorageResult<()> {
        let dir = self.scope_dir(scope);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| StorageError::from_io(e, dir.clone()))?;
        }
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|e| StorageError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
