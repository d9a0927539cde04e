//! Data models for tomo
//!
//! Defines the core data structures: Note, Folder, and NoteImage, plus the
//! persisted sort preferences. Deletion and archival are soft states carried
//! on the note itself; the paired timestamp is kept in lock step by the
//! mutators here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single note
///
/// `content` is an opaque rich-document blob; only the [`crate::content`]
/// codec ever looks inside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    /// Unique identifier
    pub id: Uuid,
    /// Note title
    pub title: String,
    /// Opaque rich-document blob
    #[serde(with = "serde_bytes")]
    pub content: Vec<u8>,
    /// When this note was last edited
    pub last_edited: DateTime<Utc>,
    /// Containing folder, `None` = unfiled
    pub folder_id: Option<Uuid>,
    /// Soft-delete flag
    pub is_deleted: bool,
    /// Set iff `is_deleted`
    pub deleted_date: Option<DateTime<Utc>>,
    /// Pinned notes form their own leading section in listings
    pub is_pinned: bool,
    /// Individually locked note
    pub is_locked: bool,
    /// Archive flag
    pub is_archived: bool,
    /// Set iff `is_archived`
    pub archived_date: Option<DateTime<Utc>>,
    /// Attached image metadata, ordered; ids are unique within the note
    pub images: Vec<NoteImage>,
}

/// Default title for a freshly created note
pub const DEFAULT_NOTE_TITLE: &str = "New Note";

impl Note {
    /// Create a new empty note, optionally filed into a folder
    pub fn new(folder_id: Option<Uuid>) -> Self {
        Self::with_id(Uuid::new_v4(), folder_id)
    }

    /// Create a note with a specific ID (for loading from storage)
    pub fn with_id(id: Uuid, folder_id: Option<Uuid>) -> Self {
        Self {
            id,
            title: DEFAULT_NOTE_TITLE.to_string(),
            content: Vec::new(),
            last_edited: Utc::now(),
            folder_id,
            is_deleted: false,
            deleted_date: None,
            is_pinned: false,
            is_locked: false,
            is_archived: false,
            archived_date: None,
            images: Vec::new(),
        }
    }

    /// Update the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.last_edited = Utc::now();
    }

    /// Replace the content blob
    pub fn set_content(&mut self, content: Vec<u8>) {
        self.content = content;
        self.last_edited = Utc::now();
    }

    /// Soft-delete the note at the given instant
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_date = Some(now);
    }

    /// Undo a soft delete
    pub fn restore(&mut self) {
        self.is_deleted = false;
        self.deleted_date = None;
    }

    /// Archive the note at the given instant
    pub fn archive(&mut self, now: DateTime<Utc>) {
        self.is_archived = true;
        self.archived_date = Some(now);
    }

    /// Move the note back out of the archive
    pub fn unarchive(&mut self) {
        self.is_archived = false;
        self.archived_date = None;
    }

    /// Attach image metadata; a duplicate id is ignored
    pub fn add_image(&mut self, image: NoteImage) {
        if !self.images.iter().any(|i| i.id == image.id) {
            self.images.push(image);
        }
    }

    /// Remove image metadata by id
    pub fn remove_image(&mut self, image_id: Uuid) {
        self.images.retain(|i| i.id != image_id);
    }
}

/// A folder grouping notes
///
/// Folders hold no references to their notes; membership is resolved by
/// scanning notes for a matching `folder_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Folder {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// When this folder was created
    pub created_date: DateTime<Utc>,
    /// A locked folder hides its notes from regular listings
    pub is_locked: bool,
}

impl Folder {
    /// Create a new folder with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Create a folder with a specific ID (for loading from storage)
    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created_date: Utc::now(),
            is_locked: false,
        }
    }
}

/// Metadata for an image attached to a note
///
/// The bytes live in the blob store under the owning note's id; `filename`
/// is the blob key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteImage {
    /// Unique identifier
    pub id: Uuid,
    /// Blob-store key, unique within the note
    pub filename: String,
    /// User-editable caption
    pub description: String,
}

impl NoteImage {
    /// Create image metadata for a stored blob
    pub fn new(filename: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            description: description.into(),
        }
    }
}

/// Field to sort the main note list by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    LastEdited,
    Title,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Persisted sort preference for the main note list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    pub field: SortField,
    pub order: SortOrder,
    /// Partition unpinned notes into calendar-day sections
    pub group_by_date: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            field: SortField::LastEdited,
            order: SortOrder::Descending,
            group_by_date: true,
        }
    }
}

/// Field to sort the archive view by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchivedSortField {
    DateArchived,
    LastEdited,
    Title,
}

/// Persisted sort preference for the archive view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedSortOptions {
    pub field: ArchivedSortField,
    pub order: SortOrder,
}

impl Default for ArchivedSortOptions {
    fn default() -> Self {
        Self {
            field: ArchivedSortField::DateArchived,
            order: SortOrder::Descending,
        }
    }
}
