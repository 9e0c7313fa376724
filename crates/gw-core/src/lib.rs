//! gw-core: Core abstractions and configuration for Guestwire
//!
//! Shared building blocks for the sync engine and its consumers: the
//! configuration model, the error taxonomy, connection state, and the trait
//! seams behind which the push channel and the REST surface live.

pub mod config;
pub mod error;
pub mod time;
pub mod traits;
pub mod types;

pub use error::{ConfigError, GwError, TransportError, UpdateError, ValidationError};
pub use types::ConnectionState;
