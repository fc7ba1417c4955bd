//! Provider-agnostic request and response types

pub mod message;
pub mod requests;
pub mod responses;

pub use message::{ChatMessage, MessageRole, split_system_messages};
pub use requests::{GatewayRequest, ProviderSelection, RequestType, SamplingParams};
pub use responses::{
    ChatResponse, ChunkStream, FinishReason, ProviderResponse, ResponseChunk, StreamSummary, Usage,
};
