//! Push-channel transport seam

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::TransportError;
use gw_protocol::ChannelMessage;

/// A live channel session.
///
/// `inbound` yields decoded messages in transmission order; `None` means
/// the transport closed. Sending on `outbound` after the transport closed
/// fails, which the connection manager treats as a transport error.
pub struct ChannelSession {
    /// Client-to-server messages
    pub outbound: mpsc::Sender<ChannelMessage>,
    /// Server-to-client messages, in arrival order
    pub inbound: mpsc::Receiver<ChannelMessage>,
}

/// Opens one channel session per call.
///
/// The production implementation dials a WebSocket; tests substitute an
/// in-memory pair.
#[async_trait]
pub trait ChannelDialer: Send + Sync + 'static {
    /// Dial the endpoint, failing if the connection is not up within
    /// `connect_timeout`.
    async fn dial(
        &self,
        url: &str,
        connect_timeout: Duration,
    ) -> Result<ChannelSession, TransportError>;
}
