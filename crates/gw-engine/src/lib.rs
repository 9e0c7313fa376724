//! gw-engine: The Guestwire synchronization engine
//!
//! Maintains one authoritative in-memory view of the guest collection from
//! three uncoordinated inputs: a bulk REST snapshot, a push channel
//! streaming incremental events, and locally initiated optimistic edits.
//! Collaborators (the CLI, a UI) consume the engine's read/write surface
//! and never touch channel or transport details directly.

pub mod channel;
pub mod dispatcher;
pub mod engine;
pub mod gateway;
pub mod health;
pub mod rest;
pub mod store;

pub use channel::{Backoff, ChannelManager, WsDialer};
pub use dispatcher::EventRouter;
pub use engine::{ChangeNotice, SyncEngine};
pub use gateway::UpdateGateway;
pub use health::HealthMonitor;
pub use rest::HttpApi;
pub use store::GuestStore;
