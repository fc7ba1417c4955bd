//! Router tests


use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::providers::{LLMProvider, ProviderError};
use crate::core::types::{
    ChatResponse, FinishReason, GatewayRequest, ProviderResponse, ResponseChunk, StreamSummary,
    Usage,
};

/// Adapter that answers from a script and records what it received
#[derive(Debug, Default)]
pub(super) struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    default_ok: bool,
    calls: AtomicUsize,
    seen: Mutex<Vec<GatewayRequest>>,
}

impl ScriptedProvider {
    pub fn always_ok() -> Self {
        Self {
            default_ok: true,
            ..Default::default()
        }
    }

    pub fn always_failing() -> Self {
        Self::default()
    }

    pub fn scripted(outcomes: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<GatewayRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn supports_model(&self, _model: &str) -> bool {
        true
    }

    async fn execute(&self, request: &GatewayRequest) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        let outcome = match next {
            Some(outcome) => outcome,
            None if self.default_ok => Ok("ok".to_string()),
            None => Err(ProviderError::provider_unavailable("scripted", "backend down")),
        };

        outcome.map(|content| {
            ProviderResponse::Complete(ChatResponse {
                model: request.model.clone(),
                content,
                finish_reason: FinishReason::Stop,
                usage: Some(Usage::new(3, 2)),
            })
        })
    }
}

/// Adapter that opens a stream, sends one chunk and then ends it with `terminal`
#[derive(Debug)]
pub(super) struct StreamingProvider {
    terminal: Result<FinishReason, ProviderError>,
    calls: AtomicUsize,
}

impl StreamingProvider {
    pub fn ending_with(terminal: Result<FinishReason, ProviderError>) -> Self {
        Self {
            terminal,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMProvider for StreamingProvider {
    fn name(&self) -> &'static str {
        "streaming"
    }

    fn supports_model(&self, _model: &str) -> bool {
        true
    }

    async fn execute(&self, request: &GatewayRequest) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let terminal = match &self.terminal {
            Ok(finish_reason) => Ok(ResponseChunk::Done(StreamSummary {
                model: request.model.clone(),
                finish_reason: *finish_reason,
                usage: None,
            })),
            Err(error) => Err(error.clone()),
        };
        let items = vec![Ok(ResponseChunk::Content("partial".to_string())), terminal];
        Ok(ProviderResponse::Stream(Box::pin(futures::stream::iter(items))))
    }
}

pub(super) fn request(provider: Option<&str>) -> GatewayRequest {
    let provider = match provider {
        Some(name) => format!(r#","provider":"{}""#, name),
        None => String::new(),
    };
    serde_json::from_str(&format!(
        r#"{{"id":"req-1","type":"chat","model":"gpt-4"{},"messages":[{{"role":"user","content":"hi"}}]}}"#,
        provider
    ))
    .unwrap()
}
