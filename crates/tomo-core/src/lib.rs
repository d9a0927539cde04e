//! tomo core library
//!
//! This crate provides the core functionality for tomo, a personal
//! note-taking system with folders, soft-delete retention, locking,
//! archiving, image attachments, and a companion-device replica kept in
//! sync over an intermittent message channel.
//!
//! # Architecture
//!
//! - **NoteStore**: sole owner of the note and folder collections; persists
//!   both on every mutation and feeds the sync pusher
//! - **query**: pure filtering/sorting/grouping/search over store snapshots
//! - **sync**: throttled full-snapshot pushes to a read-only replica
//!
//! # Quick Start
//!
//! ```text
//! let mut store = NoteStore::open(&config)?;
//!
//! // Add a note in a folder
//! let folder = store.add_folder("Work")?;
//! let note = store.add_note(Some(folder.id))?;
//!
//! // Query visible notes
//! let notes = store.get_all_notes(&NoteFilter::default());
//! ```
//!
//! # Modules
//!
//! - `store`: the authoritative state container (main entry point)
//! - `models`: Note, Folder, NoteImage, and sort preferences
//! - `query`: visibility filters, sorting, grouping, search
//! - `retention`: the 30-day soft-delete expiry policy
//! - `sync`: primary pusher and companion replica cache
//! - `storage`: key-value and blob backends
//! - `content`: rich-content codec seam
//! - `auth`: biometric gate seam
//! - `config`: application configuration

pub mod auth;
pub mod config;
pub mod content;
pub mod models;
pub mod query;
pub mod retention;
pub mod storage;
pub mod store;
pub mod sync;

pub use auth::{BiometricGate, StaticGate};
pub use config::Config;
pub use content::{ContentCodec, Utf8Codec};
pub use models::{
    ArchivedSortField, ArchivedSortOptions, Folder, Note, NoteImage, SortField, SortOptions,
    SortOrder,
};
pub use query::NoteFilter;
pub use retention::RETENTION_DAYS;
pub use storage::{StorageError, StorageResult};
pub use store::NoteStore;
