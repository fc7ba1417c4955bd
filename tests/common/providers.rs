//! In-process providers with scripted behavior

use async_trait::async_trait;
use futures::stream;
use litellm_ws_gateway::core::types::{
    ChatResponse, FinishReason, ProviderResponse, ResponseChunk, StreamSummary,
};
use litellm_ws_gateway::{GatewayRequest, LLMProvider, ProviderError, Usage};
use std::sync::atomic::{AtomicU32, Ordering};

/// Fails the first `failures` calls, then answers with `reply`
#[derive(Debug)]
pub struct ScriptedProvider {
    family: &'static str,
    reply: String,
    failures: AtomicU32,
    calls: AtomicU32,
}

impl ScriptedProvider {
    pub fn replying(family: &'static str, reply: &str) -> Self {
        Self {
            family,
            reply: reply.to_string(),
            failures: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        }
    }

    /// Every call fails
    pub fn failing(family: &'static str) -> Self {
        Self::failing_times(family, u32::MAX)
    }

    pub fn failing_times(family: &'static str, failures: u32) -> Self {
        let provider = Self::replying(family, "recovered");
        provider.failures.store(failures, Ordering::SeqCst);
        provider
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn usage(&self) -> Usage {
        Usage::new(10, self.reply.split_whitespace().count() as u32)
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.family
    }

    fn supports_model(&self, _model: &str) -> bool {
        true
    }

    async fn execute(&self, request: &GatewayRequest) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.failures.fetch_sub(1, Ordering::SeqCst);
            }
            return Err(ProviderError::provider_unavailable(
                self.family,
                "scripted outage",
            ));
        }

        if !request.stream {
            return Ok(ProviderResponse::Complete(ChatResponse {
                model: request.model.clone(),
                content: self.reply.clone(),
                finish_reason: FinishReason::Stop,
                usage: Some(self.usage()),
            }));
        }

        let mut items: Vec<Result<ResponseChunk, ProviderError>> = self
            .reply
            .split_inclusive(' ')
            .map(|word| Ok(ResponseChunk::Content(word.to_string())))
            .collect();
        items.push(Ok(ResponseChunk::Done(StreamSummary {
            model: request.model.clone(),
            finish_reason: FinishReason::Stop,
            usage: Some(self.usage()),
        })));
        Ok(ProviderResponse::Stream(Box::pin(stream::iter(items))))
    }
}
