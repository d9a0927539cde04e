//! Note command handlers

use anyhow::{bail, Context, Result};
use chrono::Utc;

use tomo_core::query::{group_by_day, sort_notes, split_pinned};
use tomo_core::{BiometricGate, Note, NoteFilter, NoteStore, SortField, SortOrder};

use crate::commands::{resolve_folder_id, resolve_image_id, resolve_note_id};
use crate::output::Output;
use crate::prompt::confirm;

/// Create a new note
pub fn add(
    store: &mut NoteStore,
    folder: Option<String>,
    title: Option<String>,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let folder_id = match folder {
        Some(ref name) => Some(resolve_folder_id(store, name)?),
        None => None,
    };

    let mut note = store.add_note(folder_id).context("Failed to add note")?;
    if title.is_some() || text.is_some() {
        if let Some(title) = title {
            note.set_title(title);
        }
        if let Some(text) = text {
            note.set_content(text.into_bytes());
        }
        store.update_note(&note).context("Failed to update note")?;
    }

    output.success(&format!(
        "Added note {} - {}",
        &note.id.to_string()[..8],
        note.title
    ));
    Ok(())
}

/// List notes, grouped and sorted by the persisted preference
#[allow(clippy::too_many_arguments)]
pub async fn list(
    store: &mut NoteStore,
    folder: Option<String>,
    include_archived: bool,
    unlock: bool,
    sort: Option<SortField>,
    order: Option<SortOrder>,
    flat: bool,
    gate: &dyn BiometricGate,
    output: &Output,
) -> Result<()> {
    let respect_folder_lock = if unlock {
        if !gate.authenticate("Show notes in locked folders").await {
            bail!("Authentication failed");
        }
        false
    } else {
        true
    };

    let filter = NoteFilter {
        include_archived,
        respect_folder_lock,
        ..Default::default()
    };

    // Flag overrides become the new persisted preference
    let mut options = store.sort_options();
    if sort.is_some() || order.is_some() {
        if let Some(field) = sort {
            options.field = field;
        }
        if let Some(order) = order {
            options.order = order;
        }
        store
            .set_sort_options(options)
            .context("Failed to persist sort preference")?;
    }

    let notes = match folder {
        Some(ref name) if name == "unfiled" => store.get_notes(None, &filter),
        Some(ref name) => {
            let folder_id = resolve_folder_id(store, name)?;
            store.get_notes(Some(folder_id), &filter)
        }
        None => store.get_all_notes(&filter),
    };

    let sorted = sort_notes(notes, &options);
    let (pinned, unpinned) = split_pinned(sorted);

    let mut sections = Vec::new();
    if !pinned.is_empty() {
        sections.push(("Pinned".to_string(), pinned));
    }
    if options.group_by_date && !flat {
        sections.extend(group_by_day(&unpinned, &options, Utc::now()));
        output.print_note_sections(&sections);
    } else if sections.is_empty() {
        output.print_notes(&unpinned);
    } else {
        sections.push(("Notes".to_string(), unpinned));
        output.print_note_sections(&sections);
    }

    Ok(())
}

/// Show a single note; a locked note goes through the gate first
pub async fn show(
    store: &NoteStore,
    id: String,
    gate: &dyn BiometricGate,
    output: &Output,
) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    let Some(note) = store.get_note(note_id) else {
        bail!("Note not found: {}", id);
    };

    if note.is_locked {
        let reason = format!("Unlock note '{}'", note.title);
        if !gate.authenticate(&reason).await {
            bail!("Authentication failed");
        }
    }

    let folder_name = note.folder_id.and_then(|fid| store.folder_name(fid));
    let snippet = store.first_content_line(note);
    output.print_note(note, folder_name, snippet.as_deref());
    Ok(())
}

/// Edit a note's title or content
pub fn edit(
    store: &mut NoteStore,
    id: String,
    title: Option<String>,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    let Some(note) = store.get_note(note_id) else {
        bail!("Note not found: {}", id);
    };

    if title.is_none() && text.is_none() {
        bail!("Nothing to change. Pass --title and/or --text.");
    }

    let mut note: Note = note.clone();
    if let Some(title) = title {
        note.set_title(title);
    }
    if let Some(text) = text {
        note.set_content(text.into_bytes());
    }
    store.update_note(&note).context("Failed to update note")?;

    output.success(&format!("Updated note {}", &note_id.to_string()[..8]));
    Ok(())
}

/// Soft-delete a note
pub fn delete(store: &mut NoteStore, id: String, output: &Output) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    store.delete_note(note_id).context("Failed to delete note")?;
    output.success(&format!(
        "Moved note {} to Recently Deleted",
        &note_id.to_string()[..8]
    ));
    Ok(())
}

/// Restore a soft-deleted note
pub fn restore(store: &mut NoteStore, id: String, output: &Output) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    store
        .restore_note(note_id)
        .context("Failed to restore note")?;
    output.success(&format!("Restored note {}", &note_id.to_string()[..8]));
    Ok(())
}

/// Permanently delete a note and its images
pub fn purge(store: &mut NoteStore, id: String, output: &Output) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    let Some(note) = store.get_note(note_id) else {
        bail!("Note not found: {}", id);
    };

    if output.should_prompt() {
        println!(
            "Permanently delete note: {} - {}",
            &note.id.to_string()[..8],
            note.title
        );
        if !confirm("This cannot be undone. Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .permanently_delete_note(note_id)
        .context("Failed to delete note")?;
    output.success(&format!(
        "Permanently deleted note {}",
        &note_id.to_string()[..8]
    ));
    Ok(())
}

/// Toggle a note's pinned state
pub fn pin(store: &mut NoteStore, id: String, output: &Output) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    store.toggle_pin(note_id).context("Failed to toggle pin")?;

    let pinned = store.get_note(note_id).map(|n| n.is_pinned).unwrap_or(false);
    output.success(&format!(
        "{} note {}",
        if pinned { "Pinned" } else { "Unpinned" },
        &note_id.to_string()[..8]
    ));
    Ok(())
}

/// Lock a note
pub fn lock(store: &mut NoteStore, id: String, output: &Output) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    store.lock_note(note_id).context("Failed to lock note")?;
    output.success(&format!("Locked note {}", &note_id.to_string()[..8]));
    Ok(())
}

/// Unlock a note after authenticating
pub async fn unlock(
    store: &mut NoteStore,
    id: String,
    gate: &dyn BiometricGate,
    output: &Output,
) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;

    if !gate.authenticate("Unlock note").await {
        bail!("Authentication failed");
    }

    store.unlock_note(note_id).context("Failed to unlock note")?;
    output.success(&format!("Unlocked note {}", &note_id.to_string()[..8]));
    Ok(())
}

/// Archive a note
pub fn archive(store: &mut NoteStore, id: String, output: &Output) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    store
        .archive_note(note_id)
        .context("Failed to archive note")?;
    output.success(&format!("Archived note {}", &note_id.to_string()[..8]));
    Ok(())
}

/// Move a note back out of the archive
pub fn unarchive(store: &mut NoteStore, id: String, output: &Output) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    store
        .unarchive_note(note_id)
        .context("Failed to unarchive note")?;
    output.success(&format!("Unarchived note {}", &note_id.to_string()[..8]));
    Ok(())
}

/// Re-file a note into a folder, or back to unfiled
pub fn move_note(
    store: &mut NoteStore,
    id: String,
    folder: Option<String>,
    output: &Output,
) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    let folder_id = match folder {
        Some(ref name) => Some(resolve_folder_id(store, name)?),
        None => None,
    };

    store
        .move_note(note_id, folder_id)
        .context("Failed to move note")?;

    let destination = folder_id
        .and_then(|fid| store.folder_name(fid))
        .unwrap_or("Unfiled");
    output.success(&format!(
        "Moved note {} to {}",
        &note_id.to_string()[..8],
        destination
    ));
    Ok(())
}

/// Search titles and first content lines
pub fn search(store: &NoteStore, query: String, output: &Output) -> Result<()> {
    let hits = store.search_notes(&query, &NoteFilter::default());
    output.print_notes(&hits);
    Ok(())
}

/// Attach an image file to a note
pub fn attach(
    store: &mut NoteStore,
    id: String,
    file: String,
    description: Option<String>,
    output: &Output,
) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    let bytes =
        std::fs::read(&file).with_context(|| format!("Failed to read image file: {}", file))?;

    match store
        .save_image(note_id, &bytes, description.as_deref().unwrap_or(""))
        .context("Failed to save image")?
    {
        Some(image) => {
            output.success(&format!(
                "Attached image {} to note {}",
                &image.id.to_string()[..8],
                &note_id.to_string()[..8]
            ));
            Ok(())
        }
        None => bail!("Could not store the image"),
    }
}

/// List a note's images
pub fn images(store: &NoteStore, id: String, output: &Output) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    let Some(note) = store.get_note(note_id) else {
        bail!("Note not found: {}", id);
    };

    if note.images.is_empty() {
        output.message("No images attached.");
        return Ok(());
    }
    for image in &note.images {
        let caption = if image.description.is_empty() {
            "(no description)"
        } else {
            &image.description
        };
        println!(
            "{} | {} | {}",
            &image.id.to_string()[..8],
            image.filename,
            caption
        );
    }
    Ok(())
}

/// Remove an image from a note
pub fn detach(store: &mut NoteStore, id: String, image: String, output: &Output) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    let image_id = resolve_image_id(store, note_id, &image)?;

    store
        .delete_image(note_id, image_id)
        .context("Failed to delete image")?;
    output.success(&format!("Removed image {}", &image_id.to_string()[..8]));
    Ok(())
}

/// Update an image's description
pub fn describe(
    store: &mut NoteStore,
    id: String,
    image: String,
    text: String,
    output: &Output,
) -> Result<()> {
    let note_id = resolve_note_id(store, &id)?;
    let image_id = resolve_image_id(store, note_id, &image)?;

    store
        .update_image_description(note_id, image_id, text)
        .context("Failed to update image description")?;
    output.success(&format!(
        "Updated description of image {}",
        &image_id.to_string()[..8]
    ));
    Ok(())
}
