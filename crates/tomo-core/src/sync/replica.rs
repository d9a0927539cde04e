//! Companion-side cache
//!
//! The companion device holds a read-only copy of the primary's folders and
//! notes. Every snapshot it receives, pulled or pushed, replaces the whole
//! cache; there is no field-level merge, and local-only state is discarded.
//! The replica never writes back.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::channel::SyncChannel;
use super::message::SyncMessage;
use crate::models::{Folder, Note};

/// Read-only replica of the primary store
pub struct ReplicaCache {
    channel: Arc<dyn SyncChannel>,
    incoming: Option<mpsc::UnboundedReceiver<SyncMessage>>,
    folders: Vec<Folder>,
    notes: Vec<Note>,
    is_syncing: bool,
}

impl ReplicaCache {
    /// Create an empty replica over the given channel
    pub fn new(channel: Arc<dyn SyncChannel>) -> Self {
        let incoming = channel.take_incoming();
        if incoming.is_none() {
            warn!("sync channel incoming stream already taken, replica will never receive");
        }
        Self {
            channel,
            incoming,
            folders: Vec::new(),
            notes: Vec::new(),
            is_syncing: false,
        }
    }

    /// Cached folders
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Cached notes
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Whether a pull is in flight
    pub fn is_syncing(&self) -> bool {
        self.is_syncing
    }

    /// Ask the primary for a snapshot
    ///
    /// No-op when the channel is unreachable. A failed send clears the
    /// syncing flag immediately; otherwise it clears when the next snapshot
    /// arrives.
    pub fn request_sync(&mut self) {
        if !self.channel.is_reachable() {
            return;
        }
        self.is_syncing = true;
        if let Err(e) = self.channel.send(SyncMessage::PullRequest) {
            debug!("pull request failed: {}", e);
            self.is_syncing = false;
        }
    }

    /// Pull only when the cache is empty, to avoid redundant round trips
    pub fn request_sync_if_needed(&mut self) {
        if self.notes.is_empty() || self.folders.is_empty() {
            self.request_sync();
        }
    }

    /// Apply one received message
    ///
    /// A snapshot replaces the cache wholesale. An undecodable snapshot is
    /// discarded (the stale cache is better than an empty one) but still
    /// ends the in-flight pull.
    pub fn apply(&mut self, message: SyncMessage) {
        match &message {
            SyncMessage::Snapshot { .. } => {
                self.is_syncing = false;
                match message.decode_snapshot() {
                    Some((folders, notes)) => {
                        self.folders = folders;
                        self.notes = notes;
                    }
                    None => warn!("discarding undecodable snapshot"),
                }
            }
            // The replica never serves pulls
            SyncMessage::PullRequest => {}
        }
    }

    /// Apply everything already queued, without waiting
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Some(message) = self.incoming.as_mut().and_then(|rx| rx.try_recv().ok()) {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    /// Wait for the next message and apply it
    ///
    /// Returns `false` once the channel's incoming stream has ended.
    pub async fn recv_and_apply(&mut self) -> bool {
        let Some(rx) = self.incoming.as_mut() else {
            return false;
        };
        match rx.recv().await {
            Some(message) => {
                self.apply(message);
                true
            }
            None => false,
        }
    }

    // Derived read-only views, mirroring a subset of the query engine

    /// Notes that are not deleted
    pub fn active_notes(&self) -> Vec<Note> {
        self.notes.iter().filter(|n| !n.is_deleted).cloned().collect()
    }

    /// Soft-deleted notes
    pub fn deleted_notes(&self) -> Vec<Note> {
        self.notes.iter().filter(|n| n.is_deleted).cloned().collect()
    }

    /// Live notes filed in the given folder
    pub fn notes_in_folder(&self, folder_id: Uuid) -> Vec<Note> {
        self.notes
            .iter()
            .filter(|n| n.folder_id == Some(folder_id) && !n.is_deleted)
            .cloned()
            .collect()
    }

    /// Live notes not filed in any folder
    pub fn unfiled_notes(&self) -> Vec<Note> {
        self.notes
            .iter()
            .filter(|n| n.folder_id.is_none() && !n.is_deleted)
            .cloned()
            .collect()
    }

    /// Live notes split into (pinned, unpinned)
    pub fn pinned_split(&self) -> (Vec<Note>, Vec<Note>) {
        crate::query::split_pinned(self.active_notes())
    }
}
