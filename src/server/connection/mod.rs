//! Live connection tracking

#[allow(clippy::module_inception)]
mod connection;
mod manager;
mod transport;


pub use connection::{Connection, PendingRequest};
pub use manager::{ConnectionManager, HeartbeatReport};
pub use transport::{CloseSignal, Transport, WsTransport};
