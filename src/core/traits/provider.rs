//! Core LLM provider trait
//!
//! One implementation per backend. The router selects implementations by their registered
//! name, never by inspecting the concrete type.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{GatewayRequest, ProviderResponse};

/// Unified LLM provider interface
///
/// Implementations are stateless per call and safe to share across connections.
#[async_trait]
pub trait LLMProvider: Send + Sync + Debug + 'static {
    /// Backend family, such as "openai" or "anthropic"
    fn name(&self) -> &'static str;

    /// Whether this backend serves `model`
    fn supports_model(&self, model: &str) -> bool;

    /// Execute a normalized request.
    ///
    /// Returns a complete response, or a normalized stream when `request.stream` is set.
    /// Unsupported models fail with [`ProviderError::UnsupportedModel`] before any network
    /// call. Rate-limited failures are retried with backoff inside the adapter.
    async fn execute(&self, request: &GatewayRequest) -> Result<ProviderResponse, ProviderError>;
}
