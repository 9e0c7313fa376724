//! Message types for the Guestwire push channel
//!
//! Frames are JSON objects of the form `{"type": ..., "payload": ...}`.
//! The `type` values are the channel event names; `payload` carries the
//! message body and is omitted for bodyless messages.
//!
//! # Message Flow
//!
//! 1. Client connects and may send `request-guests` to ask for a snapshot
//! 2. Server pushes `guests-fetched` with the full collection
//! 3. Incremental changes arrive as `guest-updated` / `guest-added` /
//!    `guest-removed`
//! 4. While connected the client sends `ping` periodically and the server
//!    answers `pong`
//! 5. After a locally confirmed mutation the client publishes `guest-update`
//!    so other connected clients converge

use serde::{Deserialize, Serialize};

use crate::guest::{GuestPatch, GuestRecord, InvitationId};

/// Messages exchanged over the push channel.
///
/// Server-to-client and client-to-server messages share one enum because
/// both directions travel the same socket; [`ChannelMessage::event_name`]
/// gives the wire-level type string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ChannelMessage {
    /// Full collection snapshot pushed by the server
    GuestsFetched {
        guests: Vec<GuestRecord>,
        #[serde(default)]
        count: usize,
        #[serde(default)]
        timestamp: u64,
    },

    /// Partial update to one record, pushed by the server
    GuestUpdated(GuestPatch),

    /// New record, pushed by the server
    GuestAdded(GuestRecord),

    /// Record removal, pushed by the server
    GuestRemoved { id: InvitationId },

    /// Heartbeat reply
    Pong { timestamp: u64 },

    /// Ask the server to push a `guests-fetched` snapshot
    RequestGuests,

    /// Announce a locally confirmed partial update
    GuestUpdate(GuestPatch),

    /// Announce a locally created record
    GuestAdd(GuestRecord),

    /// Announce a locally deleted record
    GuestRemove { id: InvitationId },

    /// Heartbeat probe
    Ping { timestamp: u64 },
}

impl ChannelMessage {
    /// The wire-level event name for this message
    pub fn event_name(&self) -> &'static str {
        match self {
            ChannelMessage::GuestsFetched { .. } => "guests-fetched",
            ChannelMessage::GuestUpdated(_) => "guest-updated",
            ChannelMessage::GuestAdded(_) => "guest-added",
            ChannelMessage::GuestRemoved { .. } => "guest-removed",
            ChannelMessage::Pong { .. } => "pong",
            ChannelMessage::RequestGuests => "request-guests",
            ChannelMessage::GuestUpdate(_) => "guest-update",
            ChannelMessage::GuestAdd(_) => "guest-add",
            ChannelMessage::GuestRemove { .. } => "guest-remove",
            ChannelMessage::Ping { .. } => "ping",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_match_wire_tags() {
        let msg = ChannelMessage::RequestGuests;
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"request-guests"}"#);

        let msg = ChannelMessage::Ping { timestamp: 7 };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"ping","payload":{"timestamp":7}}"#);
    }

    #[test]
    fn test_removed_payload_carries_id() {
        let msg = ChannelMessage::GuestRemoved {
            id: InvitationId::new("inv-9"),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_event_name_round_trip() {
        for msg in [
            ChannelMessage::RequestGuests,
            ChannelMessage::Pong { timestamp: 1 },
            ChannelMessage::Ping { timestamp: 2 },
            ChannelMessage::GuestRemoved {
                id: InvitationId::new("x"),
            },
            ChannelMessage::GuestRemove {
                id: InvitationId::new("x"),
            },
        ] {
            let json = serde_json::to_string(&msg).unwrap();
            assert!(json.contains(msg.event_name()));
        }
    }
}
