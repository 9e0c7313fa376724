//! Trait seams for the engine's external surfaces
//!
//! The engine talks to the world through two seams: the push channel
//! (dialed per session) and the REST surface. Both are traits so the state
//! machine and the gateway are testable without a server.

mod channel;
mod remote;

pub use channel::{ChannelDialer, ChannelSession};
pub use remote::RemoteApi;
