//! WebSocket gateway server
//!
//! Connection tracking, the per-request pipeline, the wire protocol and the HTTP surface.

pub mod builder;
pub mod connection;
pub mod protocol;
pub mod routes;
#[allow(clippy::module_inception)]
pub mod server;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_support;

pub use builder::{ServerBuilder, run_server};
pub use connection::{Connection, ConnectionManager, Transport, WsTransport};
pub use protocol::{ClientMessage, ServerMessage};
pub use server::HttpServer;
pub use session::SessionHandler;
pub use state::AppState;
