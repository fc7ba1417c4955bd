//! Gateway session handling: one pipeline run per inbound request

mod handler;


pub use handler::SessionHandler;
