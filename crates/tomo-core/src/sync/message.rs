//! Companion sync wire messages
//!
//! Messages exchanged between the primary store and the companion replica,
//! CBOR-encoded on the wire. A snapshot always carries the complete state:
//! the folder and note collections, each independently JSON-encoded, never a
//! diff. The payload carries no revision counter; an unordered channel can
//! therefore deliver a stale snapshot after a fresher one, and the later
//! arrival wins.

use serde::{Deserialize, Serialize};

use crate::models::{Folder, Note};

/// Messages exchanged over the sync channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncMessage {
    /// Full state push: both collections, independently encoded
    #[serde(rename = "snapshot")]
    Snapshot {
        #[serde(with = "serde_bytes")]
        folders: Vec<u8>,
        #[serde(with = "serde_bytes")]
        notes: Vec<u8>,
    },

    /// Replica-initiated request for a snapshot
    #[serde(rename = "pullRequest")]
    PullRequest,
}

impl SyncMessage {
    /// Build a snapshot from the current collections
    ///
    /// `None` if either collection fails to encode.
    pub fn snapshot(folders: &[Folder], notes: &[Note]) -> Option<Self> {
        let folders = serde_json::to_vec(folders).ok()?;
        let notes = serde_json::to_vec(notes).ok()?;
        Some(SyncMessage::Snapshot { folders, notes })
    }

    /// Decode a snapshot's collections
    ///
    /// `None` for non-snapshot messages or when either payload fails to
    /// decode; a partially decodable snapshot is discarded whole.
    pub fn decode_snapshot(&self) -> Option<(Vec<Folder>, Vec<Note>)> {
        let SyncMessage::Snapshot { folders, notes } = self else {
            return None;
        };
        let folders: Vec<Folder> = serde_json::from_slice(folders).ok()?;
        let notes: Vec<Note> = serde_json::from_slice(notes).ok()?;
        Some((folders, notes))
    }

    /// Encode message to CBOR bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        ciborium::into_writer(self, &mut bytes).expect("CBOR encoding failed");
        bytes
    }

    /// Decode message from CBOR bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, ciborium::de::Error<std::io::Error>> {
        ciborium::from_reader(bytes)
    }
}
