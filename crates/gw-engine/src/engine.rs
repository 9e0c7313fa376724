//! Engine assembly and event loop
//!
//! One `SyncEngine` instance is owned by the session and passed to
//! collaborators. Activation seeds the store with a bulk fetch, then opens
//! the push channel; from there inbound events flow through the router into
//! the store, and local edits flow through the gateway.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio_util::sync::CancellationToken;

use gw_core::config::EngineConfig;
use gw_core::error::{GwError, TransportError, UpdateError};
use gw_core::traits::{ChannelDialer, RemoteApi};
use gw_core::types::ConnectionState;
use gw_protocol::{ChannelMessage, GuestPatch, GuestRecord, GuestStats, InvitationId};

use crate::channel::{ChannelManager, WsDialer};
use crate::dispatcher::EventRouter;
use crate::gateway::UpdateGateway;
use crate::health::HealthMonitor;
use crate::rest::HttpApi;
use crate::store::GuestStore;

/// Capacity of the change broadcast; slow consumers lag, they never block
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the confirmed-update publication queue
const PUBLISH_CHANNEL_CAPACITY: usize = 64;

/// A change the engine applied to its store, for collaborators that render
/// incrementally instead of re-listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeNotice {
    /// The whole collection was replaced by a snapshot
    Snapshot { count: usize },
    /// One record changed
    Updated(InvitationId),
    /// One record appeared
    Added(InvitationId),
    /// One record disappeared
    Removed(InvitationId),
}

/// The synchronization engine
pub struct SyncEngine {
    config: EngineConfig,
    api: Arc<dyn RemoteApi>,
    store: Arc<Mutex<GuestStore>>,
    manager: Arc<ChannelManager>,
    gateway: UpdateGateway,
    changes_tx: broadcast::Sender<ChangeNotice>,
    cancel: CancellationToken,
    /// Taken by `activate`
    events_rx: Option<mpsc::Receiver<ChannelMessage>>,
    /// Taken by `activate`
    publish_rx: Option<mpsc::Receiver<ChannelMessage>>,
}

impl SyncEngine {
    /// Create an engine with the production WebSocket and HTTP transports
    pub fn new(config: EngineConfig) -> Self {
        let api = Arc::new(HttpApi::new(&config.api_url));
        Self::with_parts(config, Arc::new(WsDialer::new()), api)
    }

    /// Create an engine over explicit transport seams
    pub fn with_parts(
        config: EngineConfig,
        dialer: Arc<dyn ChannelDialer>,
        api: Arc<dyn RemoteApi>,
    ) -> Self {
        let (manager, events_rx) = ChannelManager::new(config.clone(), dialer);
        let store = Arc::new(Mutex::new(GuestStore::new()));
        let (publish_tx, publish_rx) = mpsc::channel(PUBLISH_CHANNEL_CAPACITY);
        let gateway = UpdateGateway::new(
            Arc::clone(&api),
            Arc::clone(&store),
            config.debounce.clone(),
            config.limits.clone(),
            Some(publish_tx),
        );
        let (changes_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            config,
            api,
            store,
            manager,
            gateway,
            changes_tx,
            cancel: CancellationToken::new(),
            events_rx: Some(events_rx),
            publish_rx: Some(publish_rx),
        }
    }

    /// Seed the store with a bulk fetch, then open the push channel.
    ///
    /// The channel connects in the background with its own retry policy;
    /// activation only fails when the config or the bulk fetch does.
    pub async fn activate(&mut self) -> Result<(), GwError> {
        self.config.validate()?;

        let guests = self.api.fetch_guests().await.map_err(GwError::Transport)?;
        {
            let mut store = self.store.lock().await;
            store.replace_all(guests);
            tracing::info!("Seeded store with {} guests", store.len());
            let _ = self.changes_tx.send(ChangeNotice::Snapshot {
                count: store.len(),
            });
        }

        if let Some(events_rx) = self.events_rx.take() {
            let router = self.build_router();
            tokio::spawn(run_events(events_rx, router, self.cancel.clone()));
        }
        if let Some(publish_rx) = self.publish_rx.take() {
            let manager = Arc::clone(&self.manager);
            tokio::spawn(forward_publications(
                publish_rx,
                manager,
                self.cancel.clone(),
            ));
        }

        Arc::clone(&self.manager).connect().await;
        Ok(())
    }

    /// Shut down: cancel timers and tasks, close the channel, fail pending
    /// mutations. In-flight remote requests resolve their callers but
    /// cannot resurrect the torn-down channel.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.gateway.shutdown();
        self.manager.disconnect().await;
    }

    /// Read-only snapshot of the collection in insertion order
    pub async fn snapshot(&self) -> Vec<GuestRecord> {
        self.store.lock().await.list()
    }

    /// One record by key
    pub async fn get(&self, id: &InvitationId) -> Option<GuestRecord> {
        self.store.lock().await.get(id)
    }

    /// Aggregate counters over the collection
    pub async fn stats(&self) -> GuestStats {
        self.store.lock().await.stats()
    }

    /// Submit a local partial edit; see [`UpdateGateway::submit`]
    pub async fn submit(&self, patch: GuestPatch) -> Result<GuestRecord, UpdateError> {
        self.gateway.submit(patch).await
    }

    /// Ask the server to re-push a full snapshot
    pub async fn request_refresh(&self) -> Result<(), TransportError> {
        self.manager.send(ChannelMessage::RequestGuests).await
    }

    /// Announce a locally created record to other clients
    pub async fn announce_add(&self, record: GuestRecord) -> Result<(), TransportError> {
        self.manager.send(ChannelMessage::GuestAdd(record)).await
    }

    /// Announce a locally deleted record to other clients
    pub async fn announce_remove(&self, id: InvitationId) -> Result<(), TransportError> {
        self.manager.send(ChannelMessage::GuestRemove { id }).await
    }

    /// Current channel state
    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Subscribe to every channel state transition
    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.manager.subscribe()
    }

    /// Sampled boolean connectivity signal; see [`HealthMonitor`]
    pub fn health(&self) -> Result<watch::Receiver<bool>, GwError> {
        let monitor = HealthMonitor::new(self.config.health.sample_interval);
        monitor.spawn(self.manager.subscribe(), self.cancel.child_token())
    }

    /// Subscribe to applied-change notifications
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ChangeNotice> {
        self.changes_tx.subscribe()
    }

    /// Explicitly reconnect after the retry bound was exhausted
    pub async fn reconnect(&self) {
        Arc::clone(&self.manager).connect().await;
    }

    /// Wire the router's handlers to the store
    fn build_router(&self) -> EventRouter {
        let mut router = EventRouter::new();

        let store = Arc::clone(&self.store);
        let changes = self.changes_tx.clone();
        router.on_fetched(move |guests| {
            let store = Arc::clone(&store);
            let changes = changes.clone();
            Box::pin(async move {
                let mut store = store.lock().await;
                store.replace_all(guests);
                let _ = changes.send(ChangeNotice::Snapshot {
                    count: store.len(),
                });
            })
        });

        let store = Arc::clone(&self.store);
        let changes = self.changes_tx.clone();
        router.on_updated(move |patch| {
            let store = Arc::clone(&store);
            let changes = changes.clone();
            Box::pin(async move {
                let id = patch.invitation_id.clone();
                if store.lock().await.merge_remote(&patch) {
                    let _ = changes.send(ChangeNotice::Updated(id));
                }
            })
        });

        let store = Arc::clone(&self.store);
        let changes = self.changes_tx.clone();
        router.on_added(move |record| {
            let store = Arc::clone(&store);
            let changes = changes.clone();
            Box::pin(async move {
                let id = record.invitation_id.clone();
                store.lock().await.upsert(record);
                let _ = changes.send(ChangeNotice::Added(id));
            })
        });

        let store = Arc::clone(&self.store);
        let changes = self.changes_tx.clone();
        router.on_removed(move |id| {
            let store = Arc::clone(&store);
            let changes = changes.clone();
            Box::pin(async move {
                if store.lock().await.remove(&id) {
                    let _ = changes.send(ChangeNotice::Removed(id));
                }
            })
        });

        router
    }
}

/// Engine loop: one message at a time, in arrival order
async fn run_events(
    mut events_rx: mpsc::Receiver<ChannelMessage>,
    mut router: EventRouter,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            message = events_rx.recv() => match message {
                Some(message) => router.dispatch(message).await,
                None => break,
            },
        }
    }
}

/// Forward confirmed-update announcements onto the channel.
///
/// A publication racing a disconnect is simply dropped; the server's own
/// push to other clients does not depend on it.
async fn forward_publications(
    mut publish_rx: mpsc::Receiver<ChannelMessage>,
    manager: Arc<ChannelManager>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            message = publish_rx.recv() => match message {
                Some(message) => {
                    if let Err(e) = manager.send(message).await {
                        tracing::debug!("Dropping announcement: {}", e);
                    }
                }
                None => break,
            },
        }
    }
}
