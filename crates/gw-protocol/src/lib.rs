//! gw-protocol: Wire protocol for the Guestwire push channel
//!
//! This crate defines the guest record model and the JSON message frames
//! exchanged between the sync engine and the server over the push channel.

pub mod codec;
pub mod error;
pub mod guest;
pub mod message;

pub use codec::{decode_frame, encode_frame};
pub use error::ProtocolError;
pub use guest::{GuestPatch, GuestRecord, GuestStats, InvitationId, RsvpStatus};
pub use message::ChannelMessage;
