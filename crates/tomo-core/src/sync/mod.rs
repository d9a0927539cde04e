//! Companion-device synchronization
//!
//! The primary store pushes full snapshots to a read-only replica over an
//! intermittent message channel, throttled so edit bursts collapse into a
//! single trailing push. The replica can also pull explicitly; either way
//! a received snapshot replaces its cache wholesale.
//!
//! ## Pieces
//!
//! - [`message::SyncMessage`]: CBOR wire messages (snapshot, pull request)
//! - [`channel::SyncChannel`]: the transport seam, with an in-process
//!   [`channel::LocalChannel`] and a [`ws::WebSocketChannel`]
//! - [`push::SyncPusher`]: primary side, throttle plus pull answering
//! - [`replica::ReplicaCache`]: companion side, wholesale-overwrite cache

pub mod channel;
pub mod message;
pub mod push;
pub mod replica;
pub mod ws;

pub use channel::{ChannelError, LocalChannel, SyncChannel};
pub use message::SyncMessage;
pub use push::{SyncPusher, MIN_PUSH_INTERVAL, PUSH_MARGIN};
pub use replica::ReplicaCache;
pub use ws::WebSocketChannel;
