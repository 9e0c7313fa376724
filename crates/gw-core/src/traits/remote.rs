//! REST surface seam

use async_trait::async_trait;

use crate::error::TransportError;
use gw_protocol::{GuestPatch, GuestRecord, InvitationId};

/// The remote request surface consumed by the bulk loader and the
/// mutation path.
#[async_trait]
pub trait RemoteApi: Send + Sync + 'static {
    /// `GET /guests` — full collection snapshot
    async fn fetch_guests(&self) -> Result<Vec<GuestRecord>, TransportError>;

    /// `GET /guests/{id}` — single canonical record
    async fn fetch_guest(&self, id: &InvitationId) -> Result<GuestRecord, TransportError>;

    /// `PATCH /guests/{id}` — partial update, returns the canonical record
    async fn update_guest(&self, patch: &GuestPatch) -> Result<GuestRecord, TransportError>;
}
