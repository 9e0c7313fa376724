//! Local mutation path
//!
//! Applies user-initiated partial changes: validate, apply optimistically,
//! coalesce rapid submits per key, confirm against the server, and either
//! keep the canonical result or roll back. Every caller whose submit was
//! coalesced resolves with the outcome of the final merged request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

use gw_core::config::{AssignmentLimits, DebounceConfig};
use gw_core::error::{UpdateError, ValidationError};
use gw_core::traits::RemoteApi;
use gw_protocol::{ChannelMessage, GuestPatch, GuestRecord, InvitationId};

use crate::store::GuestStore;

/// A submit that has been applied optimistically but not yet confirmed
struct PendingMutation {
    /// Coalesced patch; later submits overlay earlier ones
    patch: GuestPatch,
    /// Record as it was before the first optimistic apply, for rollback
    prior: GuestRecord,
    /// Every coalesced caller gets the flush outcome
    waiters: Vec<oneshot::Sender<Result<GuestRecord, UpdateError>>>,
    /// Debounce timer; aborted when a newer submit arrives
    timer: JoinHandle<()>,
    /// Guards a cancelled timer against flushing a rebuilt entry
    epoch: u64,
}

struct GatewayInner {
    api: Arc<dyn RemoteApi>,
    store: Arc<Mutex<GuestStore>>,
    pending: DashMap<InvitationId, PendingMutation>,
    quiet_period: Duration,
    limits: AssignmentLimits,
    /// Confirmed updates are announced here so other clients converge
    publisher: Option<mpsc::Sender<ChannelMessage>>,
    epochs: AtomicU64,
}

/// Handle to the mutation path; clones share one pending table
#[derive(Clone)]
pub struct UpdateGateway {
    inner: Arc<GatewayInner>,
}

impl UpdateGateway {
    /// Create a gateway over the given store and remote surface
    pub fn new(
        api: Arc<dyn RemoteApi>,
        store: Arc<Mutex<GuestStore>>,
        debounce: DebounceConfig,
        limits: AssignmentLimits,
        publisher: Option<mpsc::Sender<ChannelMessage>>,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                api,
                store,
                pending: DashMap::new(),
                quiet_period: debounce.quiet_period,
                limits,
                publisher,
                epochs: AtomicU64::new(0),
            }),
        }
    }

    /// Submit a partial change to one record.
    ///
    /// Validates locally, applies the patch optimistically, and resolves
    /// once the (possibly coalesced) remote request settles: the canonical
    /// record on success, the failure after rollback otherwise.
    pub async fn submit(&self, patch: GuestPatch) -> Result<GuestRecord, UpdateError> {
        self.validate(&patch)?;

        let id = patch.invitation_id.clone();
        let (tx, rx) = oneshot::channel();

        {
            let mut store = self.inner.store.lock().await;
            let Some(current) = store.get(&id) else {
                return Err(UpdateError::NotFound(id));
            };
            store.apply_local(&patch);

            let epoch = self.inner.epochs.fetch_add(1, Ordering::Relaxed) + 1;
            match self.inner.pending.entry(id.clone()) {
                dashmap::mapref::entry::Entry::Occupied(mut entry) => {
                    let pending = entry.get_mut();
                    // a newer value supersedes the scheduled flush
                    pending.timer.abort();
                    pending.patch.merge(&patch);
                    pending.waiters.push(tx);
                    pending.epoch = epoch;
                    pending.timer = self.spawn_flush(id.clone(), epoch);
                }
                dashmap::mapref::entry::Entry::Vacant(entry) => {
                    store.begin_edit(&id);
                    entry.insert(PendingMutation {
                        patch,
                        prior: current,
                        waiters: vec![tx],
                        timer: self.spawn_flush(id.clone(), epoch),
                        epoch,
                    });
                }
            }
        }

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(UpdateError::Cancelled),
        }
    }

    /// Whether a mutation for this key is waiting to flush or in flight
    pub fn is_pending(&self, id: &InvitationId) -> bool {
        self.inner.pending.contains_key(id)
    }

    /// Abort all pending flush timers and fail their waiters.
    ///
    /// Optimistic values already applied are left in place; the engine is
    /// shutting down and the store goes with it.
    pub fn shutdown(&self) {
        let keys: Vec<InvitationId> = self
            .inner
            .pending
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        for key in keys {
            if let Some((_, pending)) = self.inner.pending.remove(&key) {
                pending.timer.abort();
                for waiter in pending.waiters {
                    let _ = waiter.send(Err(UpdateError::Cancelled));
                }
            }
        }
    }

    /// Reject out-of-range assignment values before anything is mutated
    fn validate(&self, patch: &GuestPatch) -> Result<(), ValidationError> {
        let limits = &self.inner.limits;
        if let Some(table) = patch.table_number {
            if table < limits.table_min || table > limits.table_max {
                return Err(ValidationError::OutOfRange {
                    field: "table_number",
                    value: table,
                    min: limits.table_min,
                    max: limits.table_max,
                });
            }
        }
        if let Some(position) = patch.table_position {
            if position < limits.position_min || position > limits.position_max {
                return Err(ValidationError::OutOfRange {
                    field: "table_position",
                    value: position,
                    min: limits.position_min,
                    max: limits.position_max,
                });
            }
        }
        Ok(())
    }

    /// Schedule the flush for after the quiet period
    fn spawn_flush(&self, id: InvitationId, epoch: u64) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let quiet = self.inner.quiet_period;
        tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            flush(inner, id, epoch).await;
        })
    }
}

/// Send the coalesced patch and settle every waiter.
///
/// The entry is only taken when its epoch still matches, so a timer that
/// lost an abort race cannot flush a newer pending mutation.
async fn flush(inner: Arc<GatewayInner>, id: InvitationId, epoch: u64) {
    let Some((_, pending)) = inner.pending.remove_if(&id, |_, p| p.epoch == epoch) else {
        return;
    };

    match inner.api.update_guest(&pending.patch).await {
        Ok(canonical) => {
            {
                let mut store = inner.store.lock().await;
                store.replace_canonical(canonical.clone());
                store.finish_edit(&id);
            }
            tracing::debug!(id = %id, "Update confirmed");
            if let Some(publisher) = &inner.publisher {
                let _ = publisher
                    .send(ChannelMessage::GuestUpdate(pending.patch.clone()))
                    .await;
            }
            for waiter in pending.waiters {
                let _ = waiter.send(Ok(canonical.clone()));
            }
        }
        Err(err) => {
            {
                let mut store = inner.store.lock().await;
                store.revert(&pending.patch, &pending.prior);
                store.finish_edit(&id);
            }
            tracing::warn!(id = %id, "Update failed, rolled back: {}", err);
            let failure = UpdateError::Remote(err);
            for waiter in pending.waiters {
                let _ = waiter.send(Err(failure.clone()));
            }
        }
    }
}
