//! The authoritative note and folder store
//!
//! `NoteStore` owns both collections and is the only component that mutates
//! them. Every mutation is a single in-memory update followed by a
//! synchronous persist of both collections into the key-value backend, then
//! a throttled push to the companion replica when one is attached.
//!
//! Lookups by id that miss are silent no-ops: a stale UI reference racing a
//! concurrent deletion is tolerated, not surfaced.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = NoteStore::open(&config)?;
//!
//! let folder = store.add_folder("Work")?;
//! let note = store.add_note(Some(folder.id))?;
//!
//! let visible = store.get_all_notes(&NoteFilter::default());
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::content::{ContentCodec, Utf8Codec};
use crate::models::{ArchivedSortOptions, Folder, Note, NoteImage, SortOptions};
use crate::query::{self, NoteFilter};
use crate::retention;
use crate::storage::{
    BlobStore, FsBlobStore, KvStore, SqliteKv, StorageError, ARCHIVED_SORT_OPTIONS_KEY,
    FOLDERS_KEY, NOTES_KEY, SORT_OPTIONS_KEY,
};
use crate::sync::SyncPusher;

/// Owner of the note and folder collections
pub struct NoteStore {
    /// Most-recent-first by insertion; queries impose their own order
    notes: Vec<Note>,
    folders: Vec<Folder>,
    kv: Box<dyn KvStore>,
    blobs: Box<dyn BlobStore>,
    codec: Box<dyn ContentCodec>,
    pusher: Option<SyncPusher>,
}

impl NoteStore {
    /// Open the store backed by the configured database and image directory
    ///
    /// Loads both collections (undecodable or missing data falls back to
    /// empty) and runs the retention sweep before returning.
    pub fn open(config: &Config) -> Result<Self> {
        let kv = SqliteKv::open(&config.db_path()).context("Failed to open notes database")?;
        let blobs = FsBlobStore::new(config.images_dir());
        Self::open_with_backends(Box::new(kv), Box::new(blobs))
    }

    /// Open the store over explicit backends
    pub fn open_with_backends(kv: Box<dyn KvStore>, blobs: Box<dyn BlobStore>) -> Result<Self> {
        let mut store = Self {
            notes: Vec::new(),
            folders: Vec::new(),
            kv,
            blobs,
            codec: Box::new(Utf8Codec),
            pusher: None,
        };
        store.load_collections();

        let purged = store
            .sweep_expired(Utc::now())
            .context("Retention sweep failed")?;
        if purged > 0 {
            info!("retention sweep purged {} expired note(s)", purged);
        }

        Ok(store)
    }

    /// Replace the content codec used for search and snippets
    pub fn with_codec(mut self, codec: Box<dyn ContentCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Attach the companion pusher; subsequent mutations publish through it
    pub fn attach_pusher(&mut self, pusher: SyncPusher) {
        pusher.publish(&self.folders, &self.notes);
        self.pusher = Some(pusher);
    }

    /// Current notes, most recently created first
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Current folders, in creation order
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Look up a note by id
    pub fn get_note(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Look up a folder by id
    pub fn get_folder(&self, id: Uuid) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    /// Display name for a folder id
    pub fn folder_name(&self, id: Uuid) -> Option<&str> {
        self.get_folder(id).map(|f| f.name.as_str())
    }

    // ==================== Note Operations ====================

    /// Create a new empty note at the front of the collection
    pub fn add_note(&mut self, folder_id: Option<Uuid>) -> Result<Note> {
        let note = Note::new(folder_id);
        self.notes.insert(0, note.clone());
        self.persist()?;
        Ok(note)
    }

    /// Replace the stored note with a matching id
    pub fn update_note(&mut self, updated: &Note) -> Result<()> {
        if let Some(index) = self.notes.iter().position(|n| n.id == updated.id) {
            self.notes[index] = updated.clone();
            self.persist()?;
        }
        Ok(())
    }

    /// Soft-delete a note
    pub fn delete_note(&mut self, id: Uuid) -> Result<()> {
        if let Some(index) = self.notes.iter().position(|n| n.id == id) {
            self.notes[index].mark_deleted(Utc::now());
            self.persist()?;
        }
        Ok(())
    }

    /// Undo a soft delete
    pub fn restore_note(&mut self, id: Uuid) -> Result<()> {
        if let Some(index) = self.notes.iter().position(|n| n.id == id) {
            self.notes[index].restore();
            self.persist()?;
        }
        Ok(())
    }

    /// Remove a note and its image blobs for good
    pub fn permanently_delete_note(&mut self, id: Uuid) -> Result<()> {
        if self.notes.iter().any(|n| n.id == id) {
            if let Err(e) = self.blobs.delete_scope(id) {
                warn!("failed to remove image blobs for note {}: {}", id, e);
            }
            self.notes.retain(|n| n.id != id);
            self.persist()?;
        }
        Ok(())
    }

    /// Re-file a note (`None` = unfiled)
    pub fn move_note(&mut self, id: Uuid, folder_id: Option<Uuid>) -> Result<()> {
        if let Some(index) = self.notes.iter().position(|n| n.id == id) {
            self.notes[index].folder_id = folder_id;
            self.persist()?;
        }
        Ok(())
    }

    /// Flip a note's pinned state
    pub fn toggle_pin(&mut self, id: Uuid) -> Result<()> {
        if let Some(index) = self.notes.iter().position(|n| n.id == id) {
            self.notes[index].is_pinned = !self.notes[index].is_pinned;
            self.persist()?;
        }
        Ok(())
    }

    /// Lock a single note
    pub fn lock_note(&mut self, id: Uuid) -> Result<()> {
        self.set_note_lock(id, true)
    }

    /// Unlock a single note
    pub fn unlock_note(&mut self, id: Uuid) -> Result<()> {
        self.set_note_lock(id, false)
    }

    fn set_note_lock(&mut self, id: Uuid, locked: bool) -> Result<()> {
        if let Some(index) = self.notes.iter().position(|n| n.id == id) {
            self.notes[index].is_locked = locked;
            self.persist()?;
        }
        Ok(())
    }

    /// Move a note into the archive
    pub fn archive_note(&mut self, id: Uuid) -> Result<()> {
        if let Some(index) = self.notes.iter().position(|n| n.id == id) {
            self.notes[index].archive(Utc::now());
            self.persist()?;
        }
        Ok(())
    }

    /// Move a note back out of the archive
    pub fn unarchive_note(&mut self, id: Uuid) -> Result<()> {
        if let Some(index) = self.notes.iter().position(|n| n.id == id) {
            self.notes[index].unarchive();
            self.persist()?;
        }
        Ok(())
    }

    // ==================== Folder Operations ====================

    /// Create a new folder
    pub fn add_folder(&mut self, name: impl Into<String>) -> Result<Folder> {
        let folder = Folder::new(name);
        self.folders.push(folder.clone());
        self.persist()?;
        Ok(folder)
    }

    /// Replace the stored folder with a matching id
    pub fn update_folder(&mut self, updated: &Folder) -> Result<()> {
        if let Some(index) = self.folders.iter().position(|f| f.id == updated.id) {
            self.folders[index] = updated.clone();
            self.persist()?;
        }
        Ok(())
    }

    /// Remove a folder, re-filing its notes as unfiled
    ///
    /// Folders have no trash; this removes the entity immediately. No note
    /// is deleted as a side effect.
    pub fn delete_folder(&mut self, id: Uuid) -> Result<()> {
        if self.folders.iter().any(|f| f.id == id) {
            for note in &mut self.notes {
                if note.folder_id == Some(id) {
                    note.folder_id = None;
                }
            }
            self.folders.retain(|f| f.id != id);
            self.persist()?;
        }
        Ok(())
    }

    /// Lock a folder, hiding its notes from regular listings
    pub fn lock_folder(&mut self, id: Uuid) -> Result<()> {
        self.set_folder_lock(id, true)
    }

    /// Unlock a folder
    pub fn unlock_folder(&mut self, id: Uuid) -> Result<()> {
        self.set_folder_lock(id, false)
    }

    fn set_folder_lock(&mut self, id: Uuid, locked: bool) -> Result<()> {
        if let Some(index) = self.folders.iter().position(|f| f.id == id) {
            self.folders[index].is_locked = locked;
            self.persist()?;
        }
        Ok(())
    }

    // ==================== Queries ====================

    /// Notes filed in exactly the given folder (`None` = unfiled)
    pub fn get_notes(&self, folder_id: Option<Uuid>, filter: &NoteFilter) -> Vec<Note> {
        query::notes_in_folder(&self.notes, &self.folders, folder_id, filter)
    }

    /// All notes passing the filter, regardless of folder
    pub fn get_all_notes(&self, filter: &NoteFilter) -> Vec<Note> {
        query::all_notes(&self.notes, &self.folders, filter)
    }

    /// The trash view; always bypasses folder locks
    pub fn get_recently_deleted_notes(&self) -> Vec<Note> {
        query::recently_deleted(&self.notes)
    }

    /// The archive view; deleted notes never appear here
    pub fn get_archived_notes(&self) -> Vec<Note> {
        query::archived(&self.notes)
    }

    /// Case-insensitive search over the filtered listing
    pub fn search_notes(&self, text: &str, filter: &NoteFilter) -> Vec<Note> {
        query::search_notes(&self.get_all_notes(filter), text, self.codec.as_ref())
    }

    /// First content line worth showing under a note's title
    pub fn first_content_line(&self, note: &Note) -> Option<String> {
        query::first_content_line(note, self.codec.as_ref())
    }

    // ==================== Sort Preferences ====================

    /// The persisted note-list sort preference
    pub fn sort_options(&self) -> SortOptions {
        self.load_preference(SORT_OPTIONS_KEY)
    }

    /// Persist a new note-list sort preference
    pub fn set_sort_options(&mut self, options: SortOptions) -> Result<()> {
        self.save_preference(SORT_OPTIONS_KEY, &options)
    }

    /// The persisted archive-view sort preference
    pub fn archived_sort_options(&self) -> ArchivedSortOptions {
        self.load_preference(ARCHIVED_SORT_OPTIONS_KEY)
    }

    /// Persist a new archive-view sort preference
    pub fn set_archived_sort_options(&mut self, options: ArchivedSortOptions) -> Result<()> {
        self.save_preference(ARCHIVED_SORT_OPTIONS_KEY, &options)
    }

    fn load_preference<T: serde::de::DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.kv.load(key) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("undecodable preference under '{}': {}", key, e);
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                warn!("failed to load preference under '{}': {}", key, e);
                T::default()
            }
        }
    }

    fn save_preference<T: serde::Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| StorageError::Codec(e.to_string()))
            .context("Failed to encode preference")?;
        self.kv
            .save(key, &bytes)
            .context("Failed to persist preference")
    }

    // ==================== Image Operations ====================

    /// Store image bytes and attach the metadata to a note
    ///
    /// `Ok(None)` when the note is gone or the blob write fails; the
    /// collections are untouched in either case.
    pub fn save_image(
        &mut self,
        note_id: Uuid,
        bytes: &[u8],
        description: &str,
    ) -> Result<Option<NoteImage>> {
        let Some(index) = self.notes.iter().position(|n| n.id == note_id) else {
            return Ok(None);
        };

        let filename = format!("{}.jpg", Uuid::new_v4());
        if let Err(e) = self.blobs.put(note_id, &filename, bytes) {
            warn!("failed to store image blob for note {}: {}", note_id, e);
            return Ok(None);
        }

        let image = NoteImage::new(filename, description);
        self.notes[index].add_image(image.clone());
        self.persist()?;
        Ok(Some(image))
    }

    /// Read an image's bytes back; failures degrade to `None`
    pub fn load_image(&self, note: &Note, image: &NoteImage) -> Option<Vec<u8>> {
        match self.blobs.get(note.id, &image.filename) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("failed to read image blob {}: {}", image.filename, e);
                None
            }
        }
    }

    /// Remove an image's blob and metadata
    pub fn delete_image(&mut self, note_id: Uuid, image_id: Uuid) -> Result<()> {
        let Some(index) = self.notes.iter().position(|n| n.id == note_id) else {
            return Ok(());
        };
        let Some(image) = self.notes[index].images.iter().find(|i| i.id == image_id) else {
            return Ok(());
        };

        let filename = image.filename.clone();
        if let Err(e) = self.blobs.delete(note_id, &filename) {
            warn!("failed to delete image blob {}: {}", filename, e);
        }
        self.notes[index].remove_image(image_id);
        self.persist()
    }

    /// Update an image's caption
    pub fn update_image_description(
        &mut self,
        note_id: Uuid,
        image_id: Uuid,
        description: impl Into<String>,
    ) -> Result<()> {
        if let Some(index) = self.notes.iter().position(|n| n.id == note_id) {
            if let Some(image) = self.notes[index]
                .images
                .iter_mut()
                .find(|i| i.id == image_id)
            {
                image.description = description.into();
                self.persist()?;
            }
        }
        Ok(())
    }

    // ==================== Retention ====================

    /// Hard-purge notes whose soft-delete aged past the retention window
    ///
    /// Destructive and unconfirmed; also idempotent: a second run finds
    /// nothing left to purge. Returns the number of notes removed.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> Result<usize> {
        let expired: Vec<Uuid> = self
            .notes
            .iter()
            .filter(|n| retention::is_expired(n, now))
            .map(|n| n.id)
            .collect();

        if expired.is_empty() {
            return Ok(0);
        }

        for id in &expired {
            debug!("purging expired note {}", id);
            if let Err(e) = self.blobs.delete_scope(*id) {
                warn!("failed to remove image blobs for note {}: {}", id, e);
            }
        }
        self.notes.retain(|n| !expired.contains(&n.id));
        self.persist()?;
        Ok(expired.len())
    }

    // ==================== Persistence ====================

    /// Write both collections, then notify the pusher
    fn persist(&mut self) -> Result<()> {
        let notes_bytes = serde_json::to_vec(&self.notes)
            .map_err(|e| StorageError::Codec(e.to_string()))
            .context("Failed to encode notes")?;
        let folders_bytes = serde_json::to_vec(&self.folders)
            .map_err(|e| StorageError::Codec(e.to_string()))
            .context("Failed to encode folders")?;

        self.kv
            .save(NOTES_KEY, &notes_bytes)
            .context("Failed to persist notes")?;
        self.kv
            .save(FOLDERS_KEY, &folders_bytes)
            .context("Failed to persist folders")?;

        if let Some(pusher) = &self.pusher {
            pusher.publish(&self.folders, &self.notes);
        }
        Ok(())
    }

    /// Load both collections; anything unreadable becomes empty
    fn load_collections(&mut self) {
        self.notes = self.load_collection(NOTES_KEY);
        self.folders = self.load_collection(FOLDERS_KEY);
    }

    fn load_collection<T: serde::de::DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.kv.load(key) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("undecodable collection under '{}', starting empty: {}", key, e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("failed to load collection under '{}', starting empty: {}", key, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SortField, SortOrder};
    use chrono::Duration;
    use tempfile::TempDir;

    fn test_store() -> (NoteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let kv = SqliteKv::open_in_memory().unwrap();
        let blobs = FsBlobStore::new(temp_dir.path().join("images"));
        let store = NoteStore::open_with_backends(Box::new(kv), Box::new(blobs)).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_add_note_inserts_at_front() {
        let (mut store, _dir) = test_store();

        let first = store.add_note(None).unwrap();
        let second = store.add_note(None).unwrap();

        assert_eq!(store.notes().len(), 2);
        assert_eq!(store.notes()[0].id, second.id);
        assert_eq!(store.notes()[1].id, first.id);
    }

    #[test]
    fn test_add_note_in_folder() {
        let (mut store, _dir) = test_store();
        let folder = store.add_folder("Work").unwrap();

        let note = store.add_note(Some(folder.id)).unwrap();
        assert_eq!(store.get_note(note.id).unwrap().folder_id, Some(folder.id));
    }

    #[test]
    fn test_update_note() {
        let (mut store, _dir) = test_store();
        let mut note = store.add_note(None).unwrap();

        note.set_title("Updated");
        note.set_content(b"new content".to_vec());
        store.update_note(&note).unwrap();

        let stored = store.get_note(note.id).unwrap();
        assert_eq!(stored.title, "Updated");
        assert_eq!(stored.content, b"new content");
    }

    #[test]
    fn test_update_note_id_miss_is_silent_noop() {
        let (mut store, _dir) = test_store();
        store.add_note(None).unwrap();

        let ghost = Note::new(None);
        store.update_note(&ghost).unwrap();

        assert_eq!(store.notes().len(), 1);
        assert!(store.get_note(ghost.id).is_none());
    }

    #[test]
    fn test_delete_and_restore() {
        let (mut store, _dir) = test_store();
        let note = store.add_note(None).unwrap();

        store.delete_note(note.id).unwrap();
        let stored = store.get_note(note.id).unwrap();
        assert!(stored.is_deleted);
        assert!(stored.deleted_date.is_some());
        assert_eq!(store.get_recently_deleted_notes().len(), 1);
        assert!(store.get_all_notes(&NoteFilter::default()).is_empty());

        store.restore_note(note.id).unwrap();
        let stored = store.get_note(note.id).unwrap();
        assert!(!stored.is_deleted);
        assert!(stored.deleted_date.is_none());
        assert_eq!(store.get_all_notes(&NoteFilter::default()).len(), 1);
    }

    #[test]
    fn test_archive_and_unarchive() {
        let (mut store, _dir) = test_store();
        let note = store.add_note(None).unwrap();

        store.archive_note(note.id).unwrap();
        let stored = store.get_note(note.id).unwrap();
        assert!(stored.is_archived);
        assert!(stored.archived_date.is_some());
        assert_eq!(store.get_archived_notes().len(), 1);
        assert!(store.get_all_notes(&NoteFilter::default()).is_empty());

        store.unarchive_note(note.id).unwrap();
        let stored = store.get_note(note.id).unwrap();
        assert!(!stored.is_archived);
        assert!(stored.archived_date.is_none());
    }

    #[test]
    fn test_archived_view_excludes_deleted() {
        let (mut store, _dir) = test_store();
        let note = store.add_note(None).unwrap();

        store.archive_note(note.id).unwrap();
        store.delete_note(note.id).unwrap();

        assert!(store.get_archived_notes().is_empty());
        assert_eq!(store.get_recently_deleted_notes().len(), 1);
    }

    #[test]
    fn test_toggle_pin() {
        let (mut store, _dir) = test_store();
        let note = store.add_note(None).unwrap();

        store.toggle_pin(note.id).unwrap();
        assert!(store.get_note(note.id).unwrap().is_pinned);

        store.toggle_pin(note.id).unwrap();
        assert!(!store.get_note(note.id).unwrap().is_pinned);
    }

    #[test]
    fn test_lock_and_unlock_note() {
        let (mut store, _dir) = test_store();
        let note = store.add_note(None).unwrap();

        store.lock_note(note.id).unwrap();
        assert!(store.get_note(note.id).unwrap().is_locked);

        store.unlock_note(note.id).unwrap();
        assert!(!store.get_note(note.id).unwrap().is_locked);
    }

    #[test]
    fn test_move_note() {
        let (mut store, _dir) = test_store();
        let folder = store.add_folder("Work").unwrap();
        let note = store.add_note(None).unwrap();

        store.move_note(note.id, Some(folder.id)).unwrap();
        assert_eq!(store.get_note(note.id).unwrap().folder_id, Some(folder.id));

        store.move_note(note.id, None).unwrap();
        assert!(store.get_note(note.id).unwrap().folder_id.is_none());
    }

    #[test]
    fn test_delete_folder_reassigns_notes() {
        let (mut store, _dir) = test_store();
        let folder = store.add_folder("Work").unwrap();
        let inside = store.add_note(Some(folder.id)).unwrap();
        let outside = store.add_note(None).unwrap();

        store.delete_folder(folder.id).unwrap();

        assert!(store.get_folder(folder.id).is_none());
        assert!(store.get_note(inside.id).unwrap().folder_id.is_none());
        assert!(store.get_note(outside.id).is_some());
        // No note is deleted as a side effect
        assert_eq!(store.notes().len(), 2);
    }

    #[test]
    fn test_folder_rename() {
        let (mut store, _dir) = test_store();
        let mut folder = store.add_folder("Work").unwrap();

        folder.name = "Projects".to_string();
        store.update_folder(&folder).unwrap();

        assert_eq!(store.folder_name(folder.id), Some("Projects"));
    }

    #[test]
    fn test_locked_folder_scenario() {
        // Create folder "Work", lock it, create note A inside
        let (mut store, _dir) = test_store();
        let folder = store.add_folder("Work").unwrap();
        store.lock_folder(folder.id).unwrap();
        let note = store.add_note(Some(folder.id)).unwrap();

        let respecting = store.get_all_notes(&NoteFilter::default());
        assert!(respecting.is_empty());

        let bypassing = store.get_all_notes(&NoteFilter {
            respect_folder_lock: false,
            ..Default::default()
        });
        assert_eq!(bypassing.len(), 1);
        assert_eq!(bypassing[0].id, note.id);

        // Unlocking makes the note appear in both
        store.unlock_folder(folder.id).unwrap();
        assert_eq!(store.get_all_notes(&NoteFilter::default()).len(), 1);
        assert_eq!(
            store
                .get_all_notes(&NoteFilter {
                    respect_folder_lock: false,
                    ..Default::default()
                })
                .len(),
            1
        );
    }

    #[test]
    fn test_trash_ignores_folder_lock() {
        let (mut store, _dir) = test_store();
        let folder = store.add_folder("Secret").unwrap();
        store.lock_folder(folder.id).unwrap();
        let note = store.add_note(Some(folder.id)).unwrap();
        store.delete_note(note.id).unwrap();

        assert_eq!(store.get_recently_deleted_notes().len(), 1);
    }

    #[test]
    fn test_permanently_delete_note_purges_blobs() {
        let (mut store, dir) = test_store();
        let note = store.add_note(None).unwrap();

        let image = store
            .save_image(note.id, b"jpeg bytes", "receipt")
            .unwrap()
            .unwrap();
        let blob_path = dir
            .path()
            .join("images")
            .join(note.id.to_string())
            .join(&image.filename);
        assert!(blob_path.exists());

        store.permanently_delete_note(note.id).unwrap();

        assert!(store.get_note(note.id).is_none());
        assert!(!blob_path.exists());
    }

    #[test]
    fn test_save_and_load_image() {
        let (mut store, _dir) = test_store();
        let note = store.add_note(None).unwrap();

        let image = store
            .save_image(note.id, b"pixels", "sunset")
            .unwrap()
            .unwrap();
        assert_eq!(image.description, "sunset");

        let stored = store.get_note(note.id).unwrap().clone();
        assert_eq!(stored.images.len(), 1);

        let bytes = store.load_image(&stored, &image).unwrap();
        assert_eq!(bytes, b"pixels");
    }

    #[test]
    fn test_save_image_for_missing_note_returns_none() {
        let (mut store, _dir) = test_store();
        let result = store.save_image(Uuid::new_v4(), b"bytes", "").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete_image() {
        let (mut store, _dir) = test_store();
        let note = store.add_note(None).unwrap();
        let image = store.save_image(note.id, b"bytes", "").unwrap().unwrap();

        store.delete_image(note.id, image.id).unwrap();

        let stored = store.get_note(note.id).unwrap().clone();
        assert!(stored.images.is_empty());
        assert!(store.load_image(&stored, &image).is_none());
    }

    #[test]
    fn test_update_image_description() {
        let (mut store, _dir) = test_store();
        let note = store.add_note(None).unwrap();
        let image = store.save_image(note.id, b"bytes", "old").unwrap().unwrap();

        store
            .update_image_description(note.id, image.id, "new caption")
            .unwrap();

        let stored = store.get_note(note.id).unwrap();
        assert_eq!(stored.images[0].description, "new caption");
    }

    #[test]
    fn test_sweep_expired_boundary_and_idempotence() {
        let (mut store, _dir) = test_store();
        let now = Utc::now();

        let old = store.add_note(None).unwrap();
        store.delete_note(old.id).unwrap();
        let mut old = store.get_note(old.id).unwrap().clone();
        old.deleted_date = Some(now - Duration::days(31));
        store.update_note(&old).unwrap();

        let recent = store.add_note(None).unwrap();
        store.delete_note(recent.id).unwrap();
        let mut recent = store.get_note(recent.id).unwrap().clone();
        recent.deleted_date = Some(now - Duration::days(29));
        store.update_note(&recent).unwrap();

        let purged = store.sweep_expired(now).unwrap();
        assert_eq!(purged, 1);
        assert!(store.get_note(old.id).is_none());
        assert!(store.get_note(recent.id).is_some());

        // Running again changes nothing
        let purged = store.sweep_expired(now).unwrap();
        assert_eq!(purged, 0);
        assert_eq!(store.notes().len(), 1);
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("tomo.db");
        let images = temp_dir.path().join("images");

        let note_id;
        let folder_id;
        {
            let kv = SqliteKv::open(&db_path).unwrap();
            let mut store = NoteStore::open_with_backends(
                Box::new(kv),
                Box::new(FsBlobStore::new(&images)),
            )
            .unwrap();

            let folder = store.add_folder("Work").unwrap();
            folder_id = folder.id;
            let mut note = store.add_note(Some(folder.id)).unwrap();
            note.set_title("Persistent");
            store.update_note(&note).unwrap();
            note_id = note.id;
        }

        let kv = SqliteKv::open(&db_path).unwrap();
        let store =
            NoteStore::open_with_backends(Box::new(kv), Box::new(FsBlobStore::new(&images)))
                .unwrap();

        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.get_note(note_id).unwrap().title, "Persistent");
        assert_eq!(store.folder_name(folder_id), Some("Work"));
    }

    #[test]
    fn test_round_trip_mixed_states() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("tomo.db");
        let images = temp_dir.path().join("images");

        let before;
        {
            let kv = SqliteKv::open(&db_path).unwrap();
            let mut store = NoteStore::open_with_backends(
                Box::new(kv),
                Box::new(FsBlobStore::new(&images)),
            )
            .unwrap();

            let locked = store.add_folder("Private").unwrap();
            store.lock_folder(locked.id).unwrap();
            store.add_folder("Work").unwrap();
            store.add_folder("Travel").unwrap();

            let a = store.add_note(Some(locked.id)).unwrap();
            let b = store.add_note(None).unwrap();
            store.delete_note(b.id).unwrap();
            let c = store.add_note(None).unwrap();
            store.archive_note(c.id).unwrap();
            store.add_note(None).unwrap();
            store.add_note(None).unwrap();
            drop(a);

            before = (store.notes().to_vec(), store.folders().to_vec());
        }

        let kv = SqliteKv::open(&db_path).unwrap();
        let store =
            NoteStore::open_with_backends(Box::new(kv), Box::new(FsBlobStore::new(&images)))
                .unwrap();

        assert_eq!(store.notes(), before.0.as_slice());
        assert_eq!(store.folders(), before.1.as_slice());
    }

    #[test]
    fn test_corrupt_collection_falls_back_to_empty() {
        let mut kv = SqliteKv::open_in_memory().unwrap();
        kv.save(NOTES_KEY, b"definitely not json").unwrap();

        let temp_dir = TempDir::new().unwrap();
        let store = NoteStore::open_with_backends(
            Box::new(kv),
            Box::new(FsBlobStore::new(temp_dir.path())),
        )
        .unwrap();

        assert!(store.notes().is_empty());
        assert!(store.folders().is_empty());
    }

    #[test]
    fn test_sort_preference_round_trip() {
        let (mut store, _dir) = test_store();

        assert_eq!(store.sort_options(), SortOptions::default());

        let custom = SortOptions {
            field: SortField::Title,
            order: SortOrder::Ascending,
            group_by_date: false,
        };
        store.set_sort_options(custom).unwrap();
        assert_eq!(store.sort_options(), custom);

        let archived = store.archived_sort_options();
        assert_eq!(archived, ArchivedSortOptions::default());
    }

    #[test]
    fn test_search_uses_codec() {
        let (mut store, _dir) = test_store();
        let mut note = store.add_note(None).unwrap();
        note.set_title("Plans");
        note.set_content(b"Plans\npack the tent".to_vec());
        store.update_note(&note).unwrap();

        let hits = store.search_notes("tent", &NoteFilter::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(
            store.first_content_line(&hits[0]),
            Some("pack the tent".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutations_publish_to_companion() {
        use crate::sync::{LocalChannel, SyncChannel, SyncPusher};
        use std::sync::Arc;

        let (primary_end, replica_end) = LocalChannel::pair();
        let mut incoming = replica_end.take_incoming().unwrap();

        let (mut store, _dir) = test_store();
        store.attach_pusher(SyncPusher::new(Arc::new(primary_end)));
        // Attaching pushes the current (empty) state
        incoming.try_recv().unwrap();

        tokio::time::advance(std::time::Duration::from_secs(2)).await;
        store.add_note(None).unwrap();

        let message = incoming.try_recv().unwrap();
        let (_, notes) = message.decode_snapshot().unwrap();
        assert_eq!(notes.len(), 1);
    }
}
