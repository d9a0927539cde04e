//! Soft-delete retention policy
//!
//! Deleted notes linger for a fixed window so they can be restored, then get
//! hard-purged by the sweep in [`crate::store::NoteStore::sweep_expired`].
//! The policy itself is a pure predicate so it can be tested without a
//! store.

use chrono::{DateTime, Duration, Utc};

use crate::models::Note;

/// Days a soft-deleted note survives before the sweep purges it
pub const RETENTION_DAYS: i64 = 30;

/// The retention window as a duration
pub fn retention_window() -> Duration {
    Duration::days(RETENTION_DAYS)
}

/// Whether a note's soft-delete has aged past the retention window
///
/// Notes that are not deleted, or deleted without a timestamp, never expire.
pub fn is_expired(note: &Note, now: DateTime<Utc>) -> bool {
    if !note.is_deleted {
        return false;
    }
    match note.deleted_date {
        Some(deleted) => now - deleted > retention_window(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_note_never_expires() {
        let note = Note::new(None);
        assert!(!is_expired(&note, Utc::now()));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();

        let mut old = Note::new(None);
        old.mark_deleted(now - Duration::days(31));
        assert!(is_expired(&old, now));

        let mut recent = Note::new(None);
        recent.mark_deleted(now - Duration::days(29));
        assert!(!is_expired(&recent, now));
    }

    #[test]
    fn test_exactly_at_window_is_retained() {
        let now = Utc::now();
        let mut note = Note::new(None);
        note.mark_deleted(now - retention_window());
        assert!(!is_expired(&note, now));
    }
}
