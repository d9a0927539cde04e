//! Sync channel seam
//!
//! The primary and the replica talk through a message-passing channel with
//! no delivery or ordering guarantees. Sends are enqueue-only and
//! best-effort; an unreachable channel refuses them. The incoming receiver
//! can be taken exactly once, by whoever owns the receive loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc;

use super::message::SyncMessage;

/// Errors from channel sends
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The peer is not currently reachable
    #[error("sync channel is not reachable")]
    Unreachable,

    /// The channel has shut down
    #[error("sync channel closed")]
    Closed,
}

/// A message-passing link to the peer device
pub trait SyncChannel: Send + Sync {
    /// Whether the peer is currently reachable
    fn is_reachable(&self) -> bool;

    /// Enqueue a message for the peer, best-effort
    fn send(&self, message: SyncMessage) -> Result<(), ChannelError>;

    /// Take the incoming message stream; `None` after the first call
    fn take_incoming(&self) -> Option<mpsc::UnboundedReceiver<SyncMessage>>;
}

/// In-process channel pair, for tests and same-process embedding
pub struct LocalChannel {
    outgoing: mpsc::UnboundedSender<SyncMessage>,
    incoming: Mutex<Option<mpsc::UnboundedReceiver<SyncMessage>>>,
    reachable: Arc<AtomicBool>,
}

impl LocalChannel {
    /// Create two connected ends; reachability is shared between them
    pub fn pair() -> (LocalChannel, LocalChannel) {
        let (tx_ab, rx_ab) = mpsc::unbounded_channel();
        let (tx_ba, rx_ba) = mpsc::unbounded_channel();
        let reachable = Arc::new(AtomicBool::new(true));

        let a = LocalChannel {
            outgoing: tx_ab,
            incoming: Mutex::new(Some(rx_ba)),
            reachable: reachable.clone(),
        };
        let b = LocalChannel {
            outgoing: tx_ba,
            incoming: Mutex::new(Some(rx_ab)),
            reachable,
        };
        (a, b)
    }

    /// Simulate the link going up or down
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }
}

impl SyncChannel for LocalChannel {
    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    fn send(&self, message: SyncMessage) -> Result<(), ChannelError> {
        if !self.is_reachable() {
            return Err(ChannelError::Unreachable);
        }
        self.outgoing
            .send(message)
            .map_err(|_| ChannelError::Closed)
    }

    fn take_incoming(&self) -> Option<mpsc::UnboundedReceiver<SyncMessage>> {
        self.incoming.lock().ok()?.take()
    }
}
