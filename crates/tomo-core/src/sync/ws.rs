//! WebSocket sync channel
//!
//! Carries [`SyncMessage`]s as binary CBOR frames between two processes.
//! Either side may dial (`connect`) or listen (`accept`); the channel is
//! symmetric once established. Two pump tasks shuttle frames between the
//! socket and the mpsc queues; when either side of the socket dies the
//! channel flips to unreachable and stays there; callers reconnect by
//! building a new channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, connect_async, WebSocketStream};
use tracing::{debug, warn};

use super::channel::{ChannelError, SyncChannel};
use super::message::SyncMessage;

/// WebSocket-backed implementation of [`SyncChannel`]
pub struct WebSocketChannel {
    outgoing: mpsc::UnboundedSender<SyncMessage>,
    incoming: Mutex<Option<mpsc::UnboundedReceiver<SyncMessage>>>,
    reachable: Arc<AtomicBool>,
}

impl WebSocketChannel {
    /// Dial a listening peer
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws, _) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to sync peer at {}", url))?;
        debug!("sync channel connected to {}", url);
        Ok(Self::from_stream(ws))
    }

    /// Accept one peer connection from the listener
    pub async fn accept(listener: &TcpListener) -> Result<Self> {
        let (stream, addr) = listener
            .accept()
            .await
            .context("Failed to accept sync peer connection")?;
        let ws = accept_async(stream)
            .await
            .context("WebSocket handshake failed")?;
        debug!("sync peer connected from {}", addr);
        Ok(Self::from_stream(ws))
    }

    fn from_stream<S>(ws: WebSocketStream<S>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut sink, mut stream) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SyncMessage>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let reachable = Arc::new(AtomicBool::new(true));

        // Outgoing pump: queue -> socket
        let flag = reachable.clone();
        tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                if sink.send(Message::Binary(message.encode())).await.is_err() {
                    break;
                }
            }
            // Sender side is gone; tell the peer before tearing down
            let _ = sink.close().await;
            flag.store(false, Ordering::SeqCst);
        });

        // Incoming pump: socket -> queue
        let flag = reachable.clone();
        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Binary(bytes)) => match SyncMessage::decode(&bytes) {
                        Ok(message) => {
                            if in_tx.send(message).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("dropping undecodable sync frame: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("sync channel read failed: {}", e);
                        break;
                    }
                }
            }
            flag.store(false, Ordering::SeqCst);
        });

        Self {
            outgoing: out_tx,
            incoming: Mutex::new(Some(in_rx)),
            reachable,
        }
    }
}

impl SyncChannel for WebSocketChannel {
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
