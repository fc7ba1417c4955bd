//! Normalized response types

use crate::core::providers::unified_provider::ProviderError;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Token usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Usage with `total_tokens` derived from the two parts
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    /// Stream ended or timed out without a backend-supplied reason
    Incomplete,
}

/// Complete, non-streamed answer
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub model: String,
    pub content: String,
    pub finish_reason: FinishReason,
    pub usage: Option<Usage>,
}

/// Terminal information of a stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSummary {
    pub model: String,
    pub finish_reason: FinishReason,
    pub usage: Option<Usage>,
}

/// One element of a normalized stream. Exactly one `Done` ends every stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseChunk {
    Content(String),
    Done(StreamSummary),
}

pub type ChunkStream = BoxStream<'static, Result<ResponseChunk, ProviderError>>;

/// What an adapter hands back
pub enum ProviderResponse {
    Complete(ChatResponse),
    Stream(ChunkStream),
}

impl std::fmt::Debug for ProviderResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderResponse::Complete(response) => {
                f.debug_tuple("Complete").field(response).finish()
            }
            ProviderResponse::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}
