//! Command handlers

pub mod archive;
pub mod config;
pub mod folder;
pub mod note;
pub mod status;
pub mod sync;
pub mod trash;

use anyhow::{bail, Result};
use uuid::Uuid;

use tomo_core::NoteStore;

/// Resolve a note ID (full UUID or prefix)
pub fn resolve_note_id(store: &NoteStore, id: &str) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    let matches: Vec<_> = store
        .notes()
        .iter()
        .filter(|n| n.id.to_string().starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No note found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple notes match '{}':", id);
            for note in &matches {
                eprintln!("  {} - {}", &note.id.to_string()[..8], note.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Resolve a folder ID (full UUID, prefix, or exact name)
pub fn resolve_folder_id(store: &NoteStore, id: &str) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    if let Some(folder) = store.folders().iter().find(|f| f.name == id) {
        return Ok(folder.id);
    }

    let matches: Vec<_> = store
        .folders()
        .iter()
        .filter(|f| f.id.to_string().starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No folder found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple folders match '{}':", id);
            for folder in &matches {
                eprintln!("  {} - {}", &folder.id.to_string()[..8], folder.name);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Resolve an image ID within a note (full UUID or prefix)
pub fn resolve_image_id(store: &NoteStore, note_id: Uuid, id: &str) -> Result<Uuid> {
    let Some(note) = store.get_note(note_id) else {
        bail!("No note found matching: {}", note_id);
    };

    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    let matches: Vec<_> = note
        .images
        .iter()
        .filter(|i| i.id.to_string().starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No image found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple images match '{}':", id);
            for image in &matches {
                eprintln!("  {} - {}", &image.id.to_string()[..8], image.filename);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tomo_core::storage::{FsBlobStore, SqliteKv};

    fn test_store() -> (NoteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let kv = SqliteKv::open_in_memory().unwrap();
        let blobs = FsBlobStore::new(temp_dir.path().join("images"));
        let store = NoteStore::open_with_backends(Box::new(kv), Box::new(blobs)).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_resolve_note_by_prefix() {
        let (mut store, _dir) = test_store();
        let note = store.add_note(None).unwrap();

        let prefix = &note.id.to_string()[..8];
        assert_eq!(resolve_note_id(&store, prefix).unwrap(), note.id);
        assert_eq!(
            resolve_note_id(&store, &note.id.to_string()).unwrap(),
            note.id
        );
        assert!(resolve_note_id(&store, "zzzzzzzz").is_err());
    }

    #[test]
    fn test_resolve_folder_by_name_or_prefix() {
        let (mut store, _dir) = test_store();
        let folder = store.add_folder("Work").unwrap();

        assert_eq!(resolve_folder_id(&store, "Work").unwrap(), folder.id);
        let prefix = &folder.id.to_string()[..8];
        assert_eq!(resolve_folder_id(&store, prefix).unwrap(), folder.id);
        assert!(resolve_folder_id(&store, "Missing").is_err());
    }

    #[test]
    fn test_resolve_image_by_prefix() {
        let (mut store, _dir) = test_store();
        let note = store.add_note(None).unwrap();
        let image = store.save_image(note.id, b"bytes", "").unwrap().unwrap();

        let prefix = &image.id.to_string()[..8];
        assert_eq!(
            resolve_image_id(&store, note.id, prefix).unwrap(),
            image.id
        );
        assert!(resolve_image_id(&store, note.id, "zzzzzzzz").is_err());
    }
}
