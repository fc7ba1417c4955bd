//! Streaming response normalization
//!
//! Adapters decode their backend's stream into [`StreamEvent`]s; [`normalize`] turns those
//! into the gateway's chunk stream with buffering, usage merging and a guaranteed terminal chunk.

mod buffer;
mod handler;
mod types;


pub use buffer::{ChunkBuffer, UsageAccumulator};
pub use handler::normalize;
pub use types::{StreamEvent, StreamingConfig};
