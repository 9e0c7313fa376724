//! Protocol error types

use thiserror::Error;

/// Errors that can occur while encoding or decoding channel frames
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Frame is not valid JSON or is missing required fields
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Frame carried a message type this client does not know
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),
}
