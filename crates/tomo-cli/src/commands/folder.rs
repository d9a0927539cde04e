//! Folder command handlers

use anyhow::{bail, Context, Result};

use tomo_core::{BiometricGate, NoteStore};

use crate::commands::resolve_folder_id;
use crate::output::Output;
use crate::prompt::confirm;

/// Create a new folder
pub fn add(store: &mut NoteStore, name: String, output: &Output) -> Result<()> {
    let folder = store.add_folder(name).context("Failed to add folder")?;
    output.success(&format!(
        "Added folder {} - {}",
        &folder.id.to_string()[..8],
        folder.name
    ));
    Ok(())
}

/// List folders with their live note counts
pub fn list(store: &NoteStore, output: &Output) -> Result<()> {
    let rows: Vec<_> = store
        .folders()
        .iter()
        .map(|folder| {
            let count = store
                .notes()
                .iter()
                .filter(|n| n.folder_id == Some(folder.id) && !n.is_deleted)
                .count();
            (folder.clone(), count)
        })
        .collect();

    output.print_folders(&rows);
    Ok(())
}

/// Rename a folder
pub fn rename(store: &mut NoteStore, id: String, name: String, output: &Output) -> Result<()> {
    let folder_id = resolve_folder_id(store, &id)?;
    let Some(folder) = store.get_folder(folder_id) else {
        bail!("Folder not found: {}", id);
    };

    let mut folder = folder.clone();
    folder.name = name;
    store
        .update_folder(&folder)
        .context("Failed to rename folder")?;

    output.success(&format!(
        "Renamed folder {} to {}",
        &folder_id.to_string()[..8],
        folder.name
    ));
    Ok(())
}

/// Delete a folder; its notes become unfiled
pub fn delete(store: &mut NoteStore, id: String, output: &Output) -> Result<()> {
    let folder_id = resolve_folder_id(store, &id)?;
    let Some(folder) = store.get_folder(folder_id) else {
        bail!("Folder not found: {}", id);
    };

    if output.should_prompt() {
        println!("Delete folder: {}", folder.name);
        println!("Its notes will be kept and become unfiled.");
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .delete_folder(folder_id)
        .context("Failed to delete folder")?;
    output.success(&format!("Deleted folder {}", &folder_id.to_string()[..8]));
    Ok(())
}

/// Lock a folder, hiding its notes from regular listings
pub fn lock(store: &mut NoteStore, id: String, output: &Output) -> Result<()> {
    let folder_id = resolve_folder_id(store, &id)?;
    store
        .lock_folder(folder_id)
        .context("Failed to lock folder")?;
    output.success(&format!("Locked folder {}", &folder_id.to_string()[..8]));
    Ok(())
}

/// Unlock a folder after authenticating
pub async fn unlock(
    store: &mut NoteStore,
    id: String,
    gate: &dyn BiometricGate,
    output: &Output,
) -> Result<()> {
    let folder_id = resolve_folder_id(store, &id)?;
    let name = store
        .folder_name(folder_id)
        .unwrap_or("folder")
        .to_string();

    if !gate.authenticate(&format!("Unlock folder '{}'", name)).await {
        bail!("Authentication failed");
    }

    store
        .unlock_folder(folder_id)
        .context("Failed to unlock folder")?;
    output.success(&format!("Unlocked folder {}", &folder_id.to_string()[..8]));
    Ok(())
}
