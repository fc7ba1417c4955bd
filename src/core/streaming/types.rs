//! Streaming types

use crate::core::types::{FinishReason, Usage};
use std::time::Duration;

/// One backend stream event after adapter-specific decoding
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental content
    Text(String),
    /// Model reported by the backend, replaces the requested one
    Model(String),
    /// Prompt token count (replaces any earlier value)
    PromptTokens(u32),
    /// Cumulative completion token count (replaces any earlier value)
    CompletionTokens(u32),
    /// Complete usage, delivered in one piece
    Usage(Usage),
    /// Backend-supplied finish reason
    Finish(FinishReason),
}

/// Streaming configuration
#[derive(Debug, Clone, Copy)]
pub struct StreamingConfig {
    /// Characters buffered before a chunk is emitted regardless of sentence boundaries
    pub buffer_size: usize,
    /// Deadline for the terminal chunk, measured from stream creation
    pub timeout: Duration,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            timeout: Duration::from_secs(60),
        }
    }
}
