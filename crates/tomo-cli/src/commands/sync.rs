//! Companion sync command handlers

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::net::TcpListener;

use tomo_core::sync::{ReplicaCache, SyncPusher, WebSocketChannel};
use tomo_core::{Config, NoteStore};

use crate::output::Output;

/// How long a pull waits before giving up
const PULL_TIMEOUT: Duration = Duration::from_secs(10);

/// Serve the store to a companion device
///
/// Accepts one companion connection, pushes the current state, then answers
/// pull requests until the companion disconnects.
pub async fn serve(store: &mut NoteStore, bind: String, output: &Output) -> Result<()> {
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    output.message(&format!("Waiting for companion on {}...", bind));

    let channel = Arc::new(WebSocketChannel::accept(&listener).await?);
    let pusher = SyncPusher::new(channel);
    store.attach_pusher(pusher.clone());

    output.message("Companion connected. Serving pull requests (Ctrl-C to stop).");
    pusher.serve_pulls().await;
    output.message("Companion disconnected.");
    Ok(())
}

/// Pull a snapshot from the primary, as the companion would
pub async fn pull(url: Option<String>, output: &Output) -> Result<()> {
    let url = match url {
        Some(url) => url,
        None => {
            let config = Config::load().context("Failed to load configuration")?;
            let Some(url) = config.sync_url else {
                bail!(
                    "Sync URL not configured. Set it with:\n  \
                     tomo config set sync_url ws://primary-host:7070"
                );
            };
            url
        }
    };

    output.message(&format!("Connecting to {}...", url));
    let channel = Arc::new(WebSocketChannel::connect(&url).await?);
    let mut replica = ReplicaCache::new(channel);

    replica.request_sync();
    match tokio::time::timeout(PULL_TIMEOUT, replica.recv_and_apply()).await {
        Ok(true) => {}
        Ok(false) => bail!("Sync channel closed before a snapshot arrived"),
        Err(_) => bail!("Timed out waiting for a snapshot"),
    }
    // The primary may have pushed ahead of the pull reply; drain the rest
    replica.drain();

    output.success(&format!(
        "Synced {} folder(s) and {} note(s) ({} active, {} deleted)",
        replica.folders().len(),
        replica.notes().len(),
        replica.active_notes().len(),
        replica.deleted_notes().len(),
    ));
    Ok(())
}
