//! Components shared by all adapters

pub mod config;
pub mod http;
pub mod sse;

pub use config::AdapterSettings;
pub use sse::{SseDecoder, SseEvent, decode_with, sse_events};
