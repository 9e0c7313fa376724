//! WebSocket implementation of the channel dialer

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use gw_core::error::TransportError;
use gw_core::traits::{ChannelDialer, ChannelSession};
use gw_protocol::{codec, ChannelMessage};

/// Capacity of the per-session message channels.
///
/// 256 gives headroom for a burst of push events while the engine loop is
/// busy applying earlier ones.
const SESSION_CHANNEL_CAPACITY: usize = 256;

/// Dials a WebSocket endpoint and pumps JSON text frames
#[derive(Debug, Default, Clone)]
pub struct WsDialer;

impl WsDialer {
    /// Create a new dialer
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChannelDialer for WsDialer {
    async fn dial(
        &self,
        url: &str,
        connect_timeout: Duration,
    ) -> Result<ChannelSession, TransportError> {
        let (ws_stream, _) = tokio::time::timeout(connect_timeout, connect_async(url))
            .await
            .map_err(|_| TransportError::ConnectTimeout(connect_timeout))?
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

        tracing::debug!(url, "WebSocket connected");

        let (outbound_tx, outbound_rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        let (inbound_tx, inbound_rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);

        tokio::spawn(run_socket(ws_stream, outbound_rx, inbound_tx));

        Ok(ChannelSession {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}

/// Pump frames between the socket and the session channels until either
/// side closes. Dropping the inbound sender is what signals disconnection
/// to the connection manager.
async fn run_socket(
    ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut outbound_rx: mpsc::Receiver<ChannelMessage>,
    inbound_tx: mpsc::Sender<ChannelMessage>,
) {
    let (mut sink, mut stream) = ws_stream.split();

    let send_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let text = match codec::encode_frame(&message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to encode outbound frame: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => match codec::decode_frame(&text) {
                Ok(decoded) => {
                    if inbound_tx.send(decoded).await.is_err() {
                        break;
                    }
                }
                // unknown or malformed frames are dropped, never fatal
                Err(e) => tracing::debug!("Dropping inbound frame: {}", e),
            },
            Ok(Message::Binary(_)) => {
                tracing::debug!("Dropping unexpected binary frame");
            }
            Ok(Message::Close(_)) | Err(_) => break,
            // transport-level ping/pong is handled by tungstenite itself
            _ => {}
        }
    }

    send_task.abort();
    let _ = send_task.await;
}
