//! Recently Deleted command handlers

use anyhow::{Context, Result};

use tomo_core::retention::RETENTION_DAYS;
use tomo_core::NoteStore;

use crate::output::Output;
use crate::prompt::confirm;

/// List soft-deleted notes, most recently deleted first
pub fn list(store: &NoteStore, output: &Output) -> Result<()> {
    let mut notes = store.get_recently_deleted_notes();
    notes.sort_by_key(|n| std::cmp::Reverse(n.deleted_date));

    if !notes.is_empty() && !output.is_quiet() && !output.is_json() {
        println!(
            "Notes you delete are kept here for {} days.",
            RETENTION_DAYS
        );
        println!();
    }
    output.print_notes(&notes);
    Ok(())
}

/// Permanently delete every note in the trash
pub fn empty(store: &mut NoteStore, output: &Output) -> Result<()> {
    let notes = store.get_recently_deleted_notes();
    if notes.is_empty() {
        output.message("Recently Deleted is already empty.");
        return Ok(());
    }

    if output.should_prompt() {
        println!("Permanently delete {} note(s).", notes.len());
        if !confirm("This cannot be undone. Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    for note in &notes {
        store
            .permanently_delete_note(note.id)
            .context("Failed to delete note")?;
    }
    output.success(&format!("Permanently deleted {} note(s)", notes.len()));
    Ok(())
}
