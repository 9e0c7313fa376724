//! Inbound event routing
//!
//! Demultiplexes channel messages into typed handlers. Dispatch happens on
//! the engine task, one message at a time, so handlers run in strict
//! arrival order and never concurrently. Each event type has exactly one
//! handler slot; registering again replaces the previous handler.

use futures::future::BoxFuture;

use gw_protocol::{ChannelMessage, GuestPatch, GuestRecord, InvitationId};

type Handler<T> = Box<dyn FnMut(T) -> BoxFuture<'static, ()> + Send>;

/// Routes inbound channel messages to registered handlers
#[derive(Default)]
pub struct EventRouter {
    on_fetched: Option<Handler<Vec<GuestRecord>>>,
    on_updated: Option<Handler<GuestPatch>>,
    on_added: Option<Handler<GuestRecord>>,
    on_removed: Option<Handler<InvitationId>>,
}

impl EventRouter {
    /// Create a router with no handlers
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the snapshot handler, replacing any previous one
    pub fn on_fetched<F>(&mut self, handler: F)
    where
        F: FnMut(Vec<GuestRecord>) -> BoxFuture<'static, ()> + Send + 'static,
    {
        self.on_fetched = Some(Box::new(handler));
    }

    /// Set the update handler, replacing any previous one
    pub fn on_updated<F>(&mut self, handler: F)
    where
        F: FnMut(GuestPatch) -> BoxFuture<'static, ()> + Send + 'static,
    {
        self.on_updated = Some(Box::new(handler));
    }

    /// Set the addition handler, replacing any previous one
    pub fn on_added<F>(&mut self, handler: F)
    where
        F: FnMut(GuestRecord) -> BoxFuture<'static, ()> + Send + 'static,
    {
        self.on_added = Some(Box::new(handler));
    }

    /// Set the removal handler, replacing any previous one
    pub fn on_removed<F>(&mut self, handler: F)
    where
        F: FnMut(InvitationId) -> BoxFuture<'static, ()> + Send + 'static,
    {
        self.on_removed = Some(Box::new(handler));
    }

    /// Route one message to its handler.
    ///
    /// Messages without a registered handler, and message types that only
    /// ever travel client-to-server, are logged and dropped.
    pub async fn dispatch(&mut self, message: ChannelMessage) {
        match message {
            ChannelMessage::GuestsFetched {
                guests,
                count,
                timestamp,
            } => {
                tracing::debug!(count, timestamp, "Snapshot received");
                if let Some(handler) = self.on_fetched.as_mut() {
                    handler(guests).await;
                }
            }
            ChannelMessage::GuestUpdated(patch) => {
                if let Some(handler) = self.on_updated.as_mut() {
                    handler(patch).await;
                }
            }
            ChannelMessage::GuestAdded(record) => {
                if let Some(handler) = self.on_added.as_mut() {
                    handler(record).await;
                }
            }
            ChannelMessage::GuestRemoved { id } => {
                if let Some(handler) = self.on_removed.as_mut() {
                    handler(id).await;
                }
            }
            other => {
                tracing::debug!(
                    event = other.event_name(),
                    "Dropping unexpected channel message"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_dispatch_in_arrival_order() {
        let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let mut router = EventRouter::new();

        let log = Arc::clone(&order);
        router.on_added(move |record| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().await.push(format!("added:{}", record.invitation_id));
            })
        });
        let log = Arc::clone(&order);
        router.on_removed(move |id| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().await.push(format!("removed:{}", id));
            })
        });

        router
            .dispatch(ChannelMessage::GuestAdded(GuestRecord::new("a", "Ana")))
            .await;
        router
            .dispatch(ChannelMessage::GuestRemoved {
                id: InvitationId::new("a"),
            })
            .await;

        assert_eq!(
            *order.lock().await,
            vec!["added:a".to_string(), "removed:a".to_string()]
        );
    }

    #[tokio::test]
    async fn test_reregistration_replaces_handler() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut router = EventRouter::new();

        let counter = Arc::clone(&first);
        router.on_removed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {})
        });
        let counter = Arc::clone(&second);
        router.on_removed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {})
        });

        router
            .dispatch(ChannelMessage::GuestRemoved {
                id: InvitationId::new("x"),
            })
            .await;

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_outbound_only_messages_are_dropped() {
        let mut router = EventRouter::new();
        // no handlers registered at all; nothing should panic
        router.dispatch(ChannelMessage::RequestGuests).await;
        router
            .dispatch(ChannelMessage::Ping { timestamp: 1 })
            .await;
    }
}
