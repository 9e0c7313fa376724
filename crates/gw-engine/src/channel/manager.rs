//! Channel supervision
//!
//! Owns the push-channel lifecycle: dialing, the connection state machine,
//! bounded reconnection, and the heartbeat probe. Inbound data messages are
//! forwarded to the engine loop in arrival order; heartbeat replies are
//! consumed here and never reach the engine.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use gw_core::config::EngineConfig;
use gw_core::error::TransportError;
use gw_core::time::{current_time_millis, elapsed_millis};
use gw_core::traits::{ChannelDialer, ChannelSession};
use gw_core::types::ConnectionState;
use gw_protocol::ChannelMessage;

use super::backoff::Backoff;

/// Capacity of the event channel feeding the engine loop
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Why a connected session's pump loop returned
enum PumpExit {
    /// `disconnect()` was called
    Cancelled,
    /// The engine loop dropped its receiver; supervision is pointless
    ConsumerGone,
    /// The transport died; reconnection may follow
    Transport(String),
}

/// Establishes and supervises the push channel
pub struct ChannelManager {
    /// Engine configuration (endpoint, reconnect, heartbeat)
    config: EngineConfig,
    /// Transport seam
    dialer: Arc<dyn ChannelDialer>,
    /// Connection state publication
    state_tx: watch::Sender<ConnectionState>,
    /// Inbound data messages, forwarded to the engine loop
    events_tx: mpsc::Sender<ChannelMessage>,
    /// Outbound sender of the current session, when connected
    outbound: Mutex<Option<mpsc::Sender<ChannelMessage>>>,
    /// Supervision task of the current `connect()` call
    run_task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl ChannelManager {
    /// Create a manager and the receiver the engine loop consumes
    pub fn new(
        config: EngineConfig,
        dialer: Arc<dyn ChannelDialer>,
    ) -> (Arc<Self>, mpsc::Receiver<ChannelMessage>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);

        let manager = Arc::new(Self {
            config,
            dialer,
            state_tx,
            events_tx,
            outbound: Mutex::new(None),
            run_task: Mutex::new(None),
        });
        (manager, events_rx)
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Subscribe to connection state transitions
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Send a message over the current session.
    ///
    /// Fails when no session is up; the caller decides whether that matters
    /// (announcements are fire-and-forget, refresh requests are not).
    pub async fn send(&self, message: ChannelMessage) -> Result<(), TransportError> {
        let sender = self.outbound.lock().await.clone();
        match sender {
            Some(tx) => tx
                .send(message)
                .await
                .map_err(|_| TransportError::ChannelClosed("session ended".to_string())),
            None => Err(TransportError::ChannelClosed(
                "not connected".to_string(),
            )),
        }
    }

    /// Open the channel.
    ///
    /// Idempotent: a stale session is torn down first, then a fresh
    /// supervision task is started.
    pub async fn connect(self: Arc<Self>) {
        self.disconnect().await;

        let cancel = CancellationToken::new();
        let manager = Arc::clone(&self);
        let token = cancel.clone();
        let handle = tokio::spawn(async move { manager.run(token).await });
        *self.run_task.lock().await = Some((cancel, handle));
    }

    /// Close the channel and cancel every pending timer.
    ///
    /// The supervision task is joined, so no callback fires after return.
    pub async fn disconnect(&self) {
        if let Some((cancel, handle)) = self.run_task.lock().await.take() {
            cancel.cancel();
            let _ = handle.await;
        }
        *self.outbound.lock().await = None;
        self.state_tx.send_replace(ConnectionState::Disconnected);
    }

    /// Supervision loop: establish, pump, reconnect until cancelled or the
    /// retry bound is exhausted.
    async fn run(self: Arc<Self>, cancel: CancellationToken) {
        self.state_tx.send_replace(ConnectionState::Connecting);
        let mut first = true;

        loop {
            let Some(mut session) = self.establish(&cancel, first).await else {
                // cancelled, retries disabled, or attempts exhausted
                if !cancel.is_cancelled() {
                    self.state_tx.send_replace(ConnectionState::Disconnected);
                }
                return;
            };

            *self.outbound.lock().await = Some(session.outbound.clone());
            self.state_tx.send_replace(ConnectionState::Connected);
            tracing::info!("Channel connected to {}", self.config.channel_url);

            if !first {
                // ask for a fresh snapshot so the store reconverges after
                // whatever was missed while the channel was down
                if session
                    .outbound
                    .send(ChannelMessage::RequestGuests)
                    .await
                    .is_ok()
                {
                    tracing::debug!("Requested snapshot refresh after reconnect");
                }
            }
            first = false;

            let exit = self.pump(&mut session, &cancel).await;
            *self.outbound.lock().await = None;

            match exit {
                PumpExit::Cancelled => return,
                PumpExit::ConsumerGone => {
                    tracing::warn!("Event consumer gone, stopping channel supervision");
                    self.state_tx.send_replace(ConnectionState::Disconnected);
                    return;
                }
                PumpExit::Transport(reason) => {
                    tracing::warn!("Channel dropped: {}", reason);
                    self.state_tx.send_replace(ConnectionState::Reconnecting);
                }
            }
        }
    }

    /// Dial until a session is up, the attempt bound is exhausted, or the
    /// supervision is cancelled. The first establishment of a `connect()`
    /// dials immediately; every retry waits out the backoff schedule.
    async fn establish(
        &self,
        cancel: &CancellationToken,
        first: bool,
    ) -> Option<ChannelSession> {
        if first {
            match self.dial_once(cancel).await? {
                Ok(session) => return Some(session),
                Err(e) => tracing::warn!("Connection failed: {}", e),
            }
        }

        if !self.config.reconnect.enabled {
            return None;
        }

        let mut backoff = Backoff::from_config(&self.config.reconnect);
        loop {
            let Some(delay) = backoff.next_delay() else {
                tracing::warn!("Reconnection attempts exhausted; explicit connect required");
                return None;
            };
            self.state_tx.send_replace(ConnectionState::Reconnecting);

            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(delay) => {}
            }

            match self.dial_once(cancel).await? {
                Ok(session) => return Some(session),
                Err(e) => {
                    tracing::warn!(
                        "Reconnect attempt failed ({} left): {}",
                        backoff.remaining(),
                        e
                    );
                }
            }
        }
    }

    /// One dial, abandoned on cancellation (`None`)
    async fn dial_once(
        &self,
        cancel: &CancellationToken,
    ) -> Option<Result<ChannelSession, TransportError>> {
        tokio::select! {
            _ = cancel.cancelled() => None,
            result = self.dialer.dial(
                &self.config.channel_url,
                self.config.reconnect.connect_timeout,
            ) => Some(result),
        }
    }

    /// Forward inbound messages and run the heartbeat until the session dies
    async fn pump(&self, session: &mut ChannelSession, cancel: &CancellationToken) -> PumpExit {
        let hb = self.config.heartbeat.clone();
        let mut ping_timer =
            tokio::time::interval_at(tokio::time::Instant::now() + hb.interval, hb.interval);
        ping_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut pong_deadline: Option<tokio::time::Instant> = None;

        loop {
            let deadline = pong_deadline;
            let pong_timeout = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => return PumpExit::Cancelled,

                inbound = session.inbound.recv() => match inbound {
                    None => return PumpExit::Transport("transport closed".to_string()),
                    Some(ChannelMessage::Pong { timestamp }) => {
                        tracing::trace!(latency_ms = elapsed_millis(timestamp), "Pong received");
                        pong_deadline = None;
                    }
                    Some(message) => {
                        if self.events_tx.send(message).await.is_err() {
                            return PumpExit::ConsumerGone;
                        }
                    }
                },

                _ = ping_timer.tick(), if hb.enabled => {
                    let timestamp = current_time_millis();
                    if session
                        .outbound
                        .send(ChannelMessage::Ping { timestamp })
                        .await
                        .is_err()
                    {
                        return PumpExit::Transport(
                            "transport closed while sending ping".to_string(),
                        );
                    }
                    if pong_deadline.is_none() {
                        pong_deadline =
                            Some(tokio::time::Instant::now() + hb.timeout);
                    }
                }

                _ = pong_timeout => {
                    return PumpExit::Transport(TransportError::HeartbeatTimeout.to_string());
                }
            }
        }
    }
}
