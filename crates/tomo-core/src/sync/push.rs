//! Throttled snapshot pushes to the companion replica
//!
//! Every store mutation republishes the full state, but bursts of rapid
//! edits must not flood the channel. The pusher keeps a leaky-bucket
//! throttle: if the last push is old enough the new one goes out
//! immediately, otherwise a single trailing push is scheduled for when the
//! interval expires. Scheduling always cancels the previously pending push,
//! so a burst collapses into one trailing send that reads the snapshot slot
//! at fire time; by then every later mutation has already overwritten the
//! slot, so the trailing push carries the latest state.
//!
//! Delivery is best-effort. An unreachable channel or failed send drops the
//! push; the next mutation's throttle cycle tries again with current state.
//!
//! Requires a tokio runtime: the trailing push is a spawned delayed task.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::channel::SyncChannel;
use super::message::SyncMessage;
use crate::models::{Folder, Note};

/// Minimum spacing between pushes
pub const MIN_PUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Slack added to a trailing push so it lands past the interval
pub const PUSH_MARGIN: Duration = Duration::from_millis(50);

/// Primary-side sync bridge: throttled pushes plus pull answering
///
/// Cheap to clone; clones share the throttle and snapshot slot.
#[derive(Clone)]
pub struct SyncPusher {
    inner: Arc<PusherInner>,
}

struct PusherInner {
    channel: Arc<dyn SyncChannel>,
    min_interval: Duration,
    margin: Duration,
    /// Latest encoded snapshot; trailing pushes read this at fire time
    snapshot: RwLock<Option<SyncMessage>>,
    state: Mutex<ThrottleState>,
}

#[derive(Default)]
struct ThrottleState {
    last_push: Option<Instant>,
    /// At most one trailing push is ever pending
    pending: Option<JoinHandle<()>>,
}

impl SyncPusher {
    /// Create a pusher with the default throttle interval
    pub fn new(channel: Arc<dyn SyncChannel>) -> Self {
        Self::with_interval(channel, MIN_PUSH_INTERVAL, PUSH_MARGIN)
    }

    /// Create a pusher with a custom throttle interval
    pub fn with_interval(
        channel: Arc<dyn SyncChannel>,
        min_interval: Duration,
        margin: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(PusherInner {
                channel,
                min_interval,
                margin,
                snapshot: RwLock::new(None),
                state: Mutex::new(ThrottleState::default()),
            }),
        }
    }

    /// Record the current state and push it, throttled
    pub fn publish(&self, folders: &[Folder], notes: &[Note]) {
        let Some(message) = SyncMessage::snapshot(folders, notes) else {
            warn!("failed to encode sync snapshot, skipping push");
            return;
        };
        if let Ok(mut slot) = self.inner.snapshot.write() {
            *slot = Some(message);
        }
        self.schedule();
    }

    fn schedule(&self) {
        let Ok(mut state) = self.inner.state.lock() else {
            return;
        };
        let now = Instant::now();

        match state.last_push {
            // Within the interval: replace the pending trailing push
            Some(last) if now.duration_since(last) <= self.inner.min_interval => {
                let elapsed = now.duration_since(last);
                let delay = self.inner.min_interval - elapsed + self.inner.margin;

                if let Some(task) = state.pending.take() {
                    task.abort();
                }

                let inner = self.inner.clone();
                state.pending = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Ok(mut st) = inner.state.lock() {
                        st.last_push = Some(Instant::now());
                        st.pending = None;
                    }
                    send_current(&inner);
                }));
            }
            // First push, or the interval has passed: push immediately
            _ => {
                state.last_push = Some(now);
                if let Some(task) = state.pending.take() {
                    task.abort();
                }
                drop(state);
                send_current(&self.inner);
            }
        }
    }

    /// Answer replica pull requests with an immediate snapshot
    ///
    /// Runs until the channel's incoming stream ends. Pull replies bypass
    /// the throttle and do not advance its clock.
    pub async fn serve_pulls(&self) {
        let Some(mut incoming) = self.inner.channel.take_incoming() else {
            warn!("sync channel incoming stream already taken, cannot serve pulls");
            return;
        };
        while let Some(message) = incoming.recv().await {
            if matches!(message, SyncMessage::PullRequest) {
                debug!("answering companion pull request");
                send_current(&self.inner);
            }
        }
    }
}

fn send_current(inner: &PusherInner) {
    if !inner.channel.is_reachable() {
        debug!("sync channel unreachable, dropping push");
        return;
    }
    let message = match inner.snapshot.read() {
        Ok(slot) => slot.clone(),
        Err(_) => None,
    };
    let Some(message) = message else {
        return;
    };
    if let Err(e) = inner.channel.send(message) {
        warn!("sync push failed: {}", e);
    }
}
