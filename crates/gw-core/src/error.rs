//! Core error types for Guestwire

use std::path::PathBuf;
use std::time::Duration;

use gw_protocol::{InvitationId, ProtocolError};
use thiserror::Error;

/// Top-level error type for the Guestwire ecosystem
#[derive(Error, Debug)]
pub enum GwError {
    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Transport error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Mutation error
    #[error("Update error: {0}")]
    Update(#[from] UpdateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Channel and remote-request transport failures.
///
/// These carry their cause as text rather than a source error so one
/// outcome can be fanned out to every caller waiting on a coalesced
/// mutation.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// Could not reach the endpoint
    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    /// Dial did not complete within the configured timeout
    #[error("Connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// The channel closed underneath us
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    /// No pong arrived within the heartbeat timeout
    #[error("Heartbeat timed out")]
    HeartbeatTimeout,

    /// A one-shot remote request failed
    #[error("Request failed: {message}")]
    Request {
        /// HTTP status, when the server answered at all
        status: Option<u16>,
        message: String,
    },
}

/// Local precondition failures; these never reach the network
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Numeric field outside its configured range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Failures surfaced by a locally initiated mutation.
///
/// `Clone` because a debounced flush resolves several waiting callers with
/// the same outcome.
#[derive(Error, Debug, Clone)]
pub enum UpdateError {
    /// Mutation targets a key that is not in the store
    #[error("No guest with invitation id {0}")]
    NotFound(InvitationId),

    /// Local precondition failed; nothing was mutated or sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote request failed; the optimistic change was rolled back
    #[error("Update failed: {0}")]
    Remote(#[from] TransportError),

    /// The engine shut down before the mutation resolved
    #[error("Update cancelled by shutdown")]
    Cancelled,
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
