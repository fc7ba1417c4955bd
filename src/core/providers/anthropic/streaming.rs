//! Anthropic streaming event decoding
//!
//! Usage is split: input tokens arrive in `message_start`, the cumulative output count in
//! `message_delta` together with the stop reason.

use super::PROVIDER_NAME;
use crate::core::providers::base::SseEvent;
use crate::core::providers::unified_provider::ProviderError;
use crate::core::streaming::StreamEvent;
use crate::core::types::FinishReason;
use serde_json::Value;

pub fn finish_reason(reason: &str) -> FinishReason {
    match reason {
        "max_tokens" => FinishReason::Length,
        "tool_use" => FinishReason::ToolCalls,
        "refusal" => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    }
}

fn tokens(value: Option<&Value>) -> Option<u32> {
    value
        .and_then(|v| v.as_u64())
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}

/// Decode one SSE event
pub fn parse_event(event: &SseEvent) -> Result<Vec<StreamEvent>, ProviderError> {
    let json: Value = serde_json::from_str(&event.data).map_err(|e| {
        ProviderError::response_parsing(PROVIDER_NAME, format!("Invalid stream event: {}", e))
    })?;

    let kind = json
        .get("type")
        .and_then(|t| t.as_str())
        .or(event.event.as_deref())
        .unwrap_or_default();

    let mut events = Vec::new();
    match kind {
        "message_start" => {
            let message = json.get("message");
            if let Some(model) = message.and_then(|m| m.get("model")).and_then(|m| m.as_str()) {
                events.push(StreamEvent::Model(model.to_string()));
            }
            let usage = message.and_then(|m| m.get("usage"));
            if let Some(input) = tokens(usage.and_then(|u| u.get("input_tokens"))) {
                events.push(StreamEvent::PromptTokens(input));
            }
            if let Some(output) = tokens(usage.and_then(|u| u.get("output_tokens"))) {
                events.push(StreamEvent::CompletionTokens(output));
            }
        }
        "content_block_delta" => {
            if let Some(text) = json
                .get("delta")
                .and_then(|d| d.get("text"))
                .and_then(|t| t.as_str())
            {
                events.push(StreamEvent::Text(text.to_string()));
            }
        }
        "message_delta" => {
            if let Some(reason) = json
                .get("delta")
                .and_then(|d| d.get("stop_reason"))
                .and_then(|r| r.as_str())
            {
                events.push(StreamEvent::Finish(finish_reason(reason)));
            }
            if let Some(output) = tokens(json.get("usage").and_then(|u| u.get("output_tokens"))) {
                events.push(StreamEvent::CompletionTokens(output));
            }
        }
        "error" => return Err(stream_error(&json)),
        // ping, content_block_start/stop, message_stop
        _ => {}
    }

    Ok(events)
}

fn stream_error(json: &Value) -> ProviderError {
    let error = json.get("error");
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("Stream error")
        .to_string();
    match error.and_then(|e| e.get("type")).and_then(|t| t.as_str()) {
        Some("overloaded_error") | Some("api_error") => {
            ProviderError::provider_unavailable(PROVIDER_NAME, message)
        }
        Some("rate_limit_error") => {
            ProviderError::rate_limit_with_message(PROVIDER_NAME, message, None)
        }
        _ => ProviderError::streaming(PROVIDER_NAME, message),
    }
}
