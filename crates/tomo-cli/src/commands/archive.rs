//! Archive view command handlers

use anyhow::{Context, Result};

use tomo_core::query::sort_archived_notes;
use tomo_core::{ArchivedSortField, NoteStore, SortOrder};

use crate::output::Output;

/// List archived notes with the archive view's own sort preference
pub fn list(
    store: &mut NoteStore,
    sort: Option<ArchivedSortField>,
    order: Option<SortOrder>,
    output: &Output,
) -> Result<()> {
    let mut options = store.archived_sort_options();
    if sort.is_some() || order.is_some() {
        if let Some(field) = sort {
            options.field = field;
        }
        if let Some(order) = order {
            options.order = order;
        }
        store
            .set_archived_sort_options(options)
            .context("Failed to persist sort preference")?;
    }

    let notes = sort_archived_notes(store.get_archived_notes(), &options);
    output.print_notes(&notes);
    Ok(())
}
