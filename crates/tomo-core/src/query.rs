//! Filtering, sorting, grouping, and search over note snapshots
//!
//! Everything here is a pure function over slices borrowed from the store's
//! current collections; nothing mutates. The store exposes thin wrappers so
//! callers rarely import this module directly.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::content::ContentCodec;
use crate::models::{
    ArchivedSortField, ArchivedSortOptions, Folder, Note, SortField, SortOptions, SortOrder,
};

/// Visibility flags for note listings
///
/// Defaults reproduce the main list: live notes only, locked folders hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteFilter {
    /// Folder-scoped listings match the flag exactly; the global listing
    /// widens to include deleted notes when set
    pub include_deleted: bool,
    /// Include archived notes alongside live ones
    pub include_archived: bool,
    /// Hide notes whose folder is currently locked
    pub respect_folder_lock: bool,
}

impl Default for NoteFilter {
    fn default() -> Self {
        Self {
            include_deleted: false,
            include_archived: false,
            respect_folder_lock: true,
        }
    }
}

/// Notes filed in exactly the given folder (`None` = unfiled)
pub fn notes_in_folder(
    notes: &[Note],
    folders: &[Folder],
    folder_id: Option<Uuid>,
    filter: &NoteFilter,
) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| {
            let folder_match = note.folder_id == folder_id;
            let deleted_match = if filter.include_deleted {
                note.is_deleted
            } else {
                !note.is_deleted
            };
            let archived_match = filter.include_archived || !note.is_archived;

            folder_match
                && deleted_match
                && archived_match
                && passes_folder_lock(note, folders, filter.respect_folder_lock)
        })
        .cloned()
        .collect()
}

/// All notes regardless of folder
pub fn all_notes(notes: &[Note], folders: &[Folder], filter: &NoteFilter) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| {
            let deleted_match = filter.include_deleted || !note.is_deleted;
            let archived_match = filter.include_archived || !note.is_archived;

            deleted_match
                && archived_match
                && passes_folder_lock(note, folders, filter.respect_folder_lock)
        })
        .cloned()
        .collect()
}

/// Soft-deleted notes
///
/// The trash view always bypasses folder locks.
pub fn recently_deleted(notes: &[Note]) -> Vec<Note> {
    notes.iter().filter(|n| n.is_deleted).cloned().collect()
}

/// Archived notes; deletion wins, so a deleted note never shows here
pub fn archived(notes: &[Note]) -> Vec<Note> {
    notes
        .iter()
        .filter(|n| n.is_archived && !n.is_deleted)
        .cloned()
        .collect()
}

/// A note in a locked folder is hidden unless the caller opts out.
/// A dangling folder reference fails open.
fn passes_folder_lock(note: &Note, folders: &[Folder], respect_folder_lock: bool) -> bool {
    if !respect_folder_lock {
        return true;
    }
    let Some(folder_id) = note.folder_id else {
        return true;
    };
    match folders.iter().find(|f| f.id == folder_id) {
        Some(folder) => !folder.is_locked,
        None => true,
    }
}

/// Sort notes by the persisted preference; stable on ties
pub fn sort_notes(mut notes: Vec<Note>, options: &SortOptions) -> Vec<Note> {
    match options.field {
        SortField::LastEdited => notes.sort_by(|a, b| {
            let ord = a.last_edited.cmp(&b.last_edited);
            apply_order(ord, options.order)
        }),
        SortField::Title => notes.sort_by(|a, b| {
            let ord = a.title.to_lowercase().cmp(&b.title.to_lowercase());
            apply_order(ord, options.order)
        }),
    }
    notes
}

/// Sort the archive view; adds sort-by-archived-date over the base fields
pub fn sort_archived_notes(mut notes: Vec<Note>, options: &ArchivedSortOptions) -> Vec<Note> {
    match options.field {
        ArchivedSortField::DateArchived => notes.sort_by(|a, b| {
            let ord = a.archived_date.cmp(&b.archived_date);
            apply_order(ord, options.order)
        }),
        ArchivedSortField::LastEdited => notes.sort_by(|a, b| {
            let ord = a.last_edited.cmp(&b.last_edited);
            apply_order(ord, options.order)
        }),
        ArchivedSortField::Title => notes.sort_by(|a, b| {
            let ord = a.title.to_lowercase().cmp(&b.title.to_lowercase());
            apply_order(ord, options.order)
        }),
    }
    notes
}

fn apply_order(ord: std::cmp::Ordering, order: SortOrder) -> std::cmp::Ordering {
    match order {
        SortOrder::Ascending => ord,
        SortOrder::Descending => ord.reverse(),
    }
}

/// Split into (pinned, unpinned), preserving order within each half
pub fn split_pinned(notes: Vec<Note>) -> (Vec<Note>, Vec<Note>) {
    notes.into_iter().partition(|n| n.is_pinned)
}

/// Partition notes into calendar-day sections
///
/// Buckets are labeled "Today" / "Yesterday" / the literal date, ordered by
/// their first member's `last_edited` in the active sort direction, and each
/// bucket's members are re-sorted by the active preference.
pub fn group_by_day(
    notes: &[Note],
    options: &SortOptions,
    now: DateTime<Utc>,
) -> Vec<(String, Vec<Note>)> {
    let mut groups: Vec<(String, Vec<Note>)> = Vec::new();
    for note in notes {
        let label = day_label(note.last_edited, now);
        if let Some((_, members)) = groups.iter_mut().find(|(l, _)| *l == label) {
            members.push(note.clone());
        } else {
            groups.push((label, vec![note.clone()]));
        }
    }

    match options.order {
        SortOrder::Ascending => groups.sort_by_key(|(_, members)| members[0].last_edited),
        SortOrder::Descending => {
            groups.sort_by_key(|(_, members)| std::cmp::Reverse(members[0].last_edited))
        }
    }

    groups
        .into_iter()
        .map(|(label, members)| (label, sort_notes(members, options)))
        .collect()
}

/// Section label for a timestamp relative to `now`, on calendar-day
/// boundaries
pub fn day_label(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let day = timestamp.date_naive();
    let today = now.date_naive();
    if day == today {
        "Today".to_string()
    } else if Some(day) == today.pred_opt() {
        "Yesterday".to_string()
    } else {
        timestamp.format("%b %-d, %Y").to_string()
    }
}

/// The first content line worth showing under the title
///
/// Skips blank lines and a line that merely repeats the title. `None` when
/// the codec cannot read the blob or nothing qualifies.
pub fn first_content_line(note: &Note, codec: &dyn ContentCodec) -> Option<String> {
    let text = codec.plain_text(&note.content)?;
    text.lines()
        .find(|line| !line.trim().is_empty() && *line != note.title)
        .map(str::to_string)
}

/// Case-insensitive substring search over title and first content line
pub fn search_notes(notes: &[Note], query: &str, codec: &dyn ContentCodec) -> Vec<Note> {
    if query.is_empty() {
        return notes.to_vec();
    }
    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|note| {
            if note.title.to_lowercase().contains(&needle) {
                return true;
            }
            first_content_line(note, codec)
                .map(|line| line.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Utf8Codec;
    use chrono::Duration;

    fn note_titled(title: &str) -> Note {
        let mut note = Note::new(None);
        note.title = title.to_string();
        note
    }

    #[test]
    fn test_locked_folder_hides_notes() {
        let mut folder = Folder::new("Work");
        folder.is_locked = true;
        let note = Note::new(Some(folder.id));
        let notes = vec![note.clone()];
        let folders = vec![folder.clone()];

        let visible = all_notes(&notes, &folders, &NoteFilter::default());
        assert!(visible.is_empty());

        let bypass = all_notes(
            &notes,
            &folders,
            &NoteFilter {
                respect_folder_lock: false,
                ..Default::default()
            },
        );
        assert_eq!(bypass.len(), 1);

        // Unlocking makes the note visible again
        let mut unlocked = folder;
        unlocked.is_locked = false;
        let visible = all_notes(&notes, &[unlocked], &NoteFilter::default());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, note.id);
    }

    #[test]
    fn test_dangling_folder_reference_fails_open() {
        let note = Note::new(Some(Uuid::new_v4()));
        let visible = all_notes(&[note], &[], &NoteFilter::default());
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn test_folder_scoped_listing_matches_exactly() {
        let folder = Folder::new("Work");
        let filed = Note::new(Some(folder.id));
        let unfiled = Note::new(None);
        let notes = vec![filed.clone(), unfiled.clone()];
        let folders = vec![folder.clone()];

        let in_folder = notes_in_folder(&notes, &folders, Some(folder.id), &NoteFilter::default());
        assert_eq!(in_folder.len(), 1);
        assert_eq!(in_folder[0].id, filed.id);

        let in_none = notes_in_folder(&notes, &folders, None, &NoteFilter::default());
        assert_eq!(in_none.len(), 1);
        assert_eq!(in_none[0].id, unfiled.id);
    }

    #[test]
    fn test_folder_scoped_deleted_flag_is_exact() {
        let mut deleted = Note::new(None);
        deleted.mark_deleted(Utc::now());
        let live = Note::new(None);
        let notes = vec![deleted.clone(), live.clone()];

        let only_deleted = notes_in_folder(
            &notes,
            &[],
            None,
            &NoteFilter {
                include_deleted: true,
                ..Default::default()
            },
        );
        assert_eq!(only_deleted.len(), 1);
        assert_eq!(only_deleted[0].id, deleted.id);
    }

    #[test]
    fn test_global_deleted_flag_widens() {
        let mut deleted = Note::new(None);
        deleted.mark_deleted(Utc::now());
        let live = Note::new(None);
        let notes = vec![deleted, live];

        let widened = all_notes(
            &notes,
            &[],
            &NoteFilter {
                include_deleted: true,
                ..Default::default()
            },
        );
        assert_eq!(widened.len(), 2);
    }

    #[test]
    fn test_archived_hidden_by_default() {
        let mut archived_note = Note::new(None);
        archived_note.archive(Utc::now());
        let live = Note::new(None);
        let notes = vec![archived_note, live.clone()];

        let visible = all_notes(&notes, &[], &NoteFilter::default());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, live.id);

        let widened = all_notes(
            &notes,
            &[],
            &NoteFilter {
                include_archived: true,
                ..Default::default()
            },
        );
        assert_eq!(widened.len(), 2);
    }

    #[test]
    fn test_archive_view_never_shows_deleted() {
        let mut both = Note::new(None);
        both.archive(Utc::now());
        both.mark_deleted(Utc::now());
        let mut archived_only = Note::new(None);
        archived_only.archive(Utc::now());

        let view = archived(&[both, archived_only.clone()]);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, archived_only.id);
    }

    #[test]
    fn test_trash_bypasses_folder_lock() {
        let mut folder = Folder::new("Secret");
        folder.is_locked = true;
        let mut note = Note::new(Some(folder.id));
        note.mark_deleted(Utc::now());

        let trash = recently_deleted(&[note]);
        assert_eq!(trash.len(), 1);
    }

    #[test]
    fn test_sort_empty_list() {
        let sorted = sort_notes(Vec::new(), &SortOptions::default());
        assert!(sorted.is_empty());
    }

    #[test]
    fn test_sort_by_title_is_case_insensitive() {
        let notes = vec![note_titled("banana"), note_titled("Apple")];
        let sorted = sort_notes(
            notes,
            &SortOptions {
                field: SortField::Title,
                order: SortOrder::Ascending,
                group_by_date: false,
            },
        );
        assert_eq!(sorted[0].title, "Apple");
        assert_eq!(sorted[1].title, "banana");
    }

    #[test]
    fn test_sort_identical_titles_is_stable() {
        let first = note_titled("Same");
        let second = note_titled("Same");
        let third = note_titled("Same");
        let ids: Vec<Uuid> = vec![first.id, second.id, third.id];

        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let sorted = sort_notes(
                vec![first.clone(), second.clone(), third.clone()],
                &SortOptions {
                    field: SortField::Title,
                    order,
                    group_by_date: false,
                },
            );
            let sorted_ids: Vec<Uuid> = sorted.iter().map(|n| n.id).collect();
            assert_eq!(sorted_ids, ids);
        }
    }

    #[test]
    fn test_sort_by_last_edited() {
        let mut old = note_titled("old");
        old.last_edited = Utc::now() - Duration::hours(2);
        let recent = note_titled("recent");

        let sorted = sort_notes(
            vec![old.clone(), recent.clone()],
            &SortOptions::default(),
        );
        assert_eq!(sorted[0].id, recent.id);
        assert_eq!(sorted[1].id, old.id);
    }

    #[test]
    fn test_sort_archived_by_archive_date() {
        let now = Utc::now();
        let mut first = note_titled("first");
        first.archive(now - Duration::days(3));
        let mut second = note_titled("second");
        second.archive(now);

        let sorted = sort_archived_notes(
            vec![first.clone(), second.clone()],
            &ArchivedSortOptions::default(),
        );
        assert_eq!(sorted[0].id, second.id);
        assert_eq!(sorted[1].id, first.id);
    }

    #[test]
    fn test_split_pinned() {
        let mut pinned = note_titled("pinned");
        pinned.is_pinned = true;
        let unpinned = note_titled("unpinned");

        let (p, u) = split_pinned(vec![unpinned.clone(), pinned.clone()]);
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].id, pinned.id);
        assert_eq!(u.len(), 1);
        assert_eq!(u[0].id, unpinned.id);
    }

    #[test]
    fn test_day_labels() {
        let now = Utc::now();
        assert_eq!(day_label(now, now), "Today");
        assert_eq!(day_label(now - Duration::days(1), now), "Yesterday");

        let older = now - Duration::days(10);
        let label = day_label(older, now);
        assert_eq!(label, older.format("%b %-d, %Y").to_string());
    }

    #[test]
    fn test_group_by_day_buckets_follow_sort_direction() {
        let now = Utc::now();
        let mut today = note_titled("today");
        today.last_edited = now;
        let mut yesterday = note_titled("yesterday");
        yesterday.last_edited = now - Duration::days(1);

        let notes = vec![today.clone(), yesterday.clone()];

        let desc = group_by_day(&notes, &SortOptions::default(), now);
        assert_eq!(desc[0].0, "Today");
        assert_eq!(desc[1].0, "Yesterday");

        let asc = group_by_day(
            &notes,
            &SortOptions {
                order: SortOrder::Ascending,
                ..Default::default()
            },
            now,
        );
        assert_eq!(asc[0].0, "Yesterday");
        assert_eq!(asc[1].0, "Today");
    }

    #[test]
    fn test_first_content_line_skips_blanks_and_title() {
        let codec = Utf8Codec;
        let mut note = note_titled("Groceries");
        note.content = b"Groceries\n\n  \nmilk and eggs\nbread".to_vec();

        assert_eq!(
            first_content_line(&note, &codec),
            Some("milk and eggs".to_string())
        );
    }

    #[test]
    fn test_first_content_line_none_when_undecodable() {
        let codec = Utf8Codec;
        let mut note = note_titled("x");
        note.content = vec![0xff, 0xfe];
        assert_eq!(first_content_line(&note, &codec), None);
    }

    #[test]
    fn test_search_matches_title_and_snippet() {
        let codec = Utf8Codec;
        let mut by_title = note_titled("Meeting agenda");
        by_title.content = b"".to_vec();
        let mut by_body = note_titled("Untitled");
        by_body.content = b"Untitled\nagenda for tomorrow".to_vec();
        let other = note_titled("Recipes");

        let notes = vec![by_title.clone(), by_body.clone(), other];

        let hits = search_notes(&notes, "AGENDA", &codec);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().any(|n| n.id == by_title.id));
        assert!(hits.iter().any(|n| n.id == by_body.id));
    }

    #[test]
    fn test_search_empty_query_returns_all() {
        let codec = Utf8Codec;
        let notes = vec![note_titled("a"), note_titled("b")];
        assert_eq!(search_notes(&notes, "", &codec).len(), 2);
    }
}
