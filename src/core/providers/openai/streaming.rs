//! OpenAI stream chunk decoding

use super::PROVIDER_NAME;
use super::transform::parse_usage;
use crate::core::providers::base::{SseEvent, http};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::streaming::StreamEvent;
use crate::core::types::FinishReason;
use serde_json::Value;

pub fn finish_reason(reason: &str) -> FinishReason {
    match reason {
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        "tool_calls" | "function_call" => FinishReason::ToolCalls,
        _ => FinishReason::Stop,
    }
}

/// Decode one `chat.completion.chunk`
pub fn parse_event(event: &SseEvent) -> Result<Vec<StreamEvent>, ProviderError> {
    let data = event.data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(Vec::new());
    }

    let chunk: Value = serde_json::from_str(data).map_err(|e| {
        ProviderError::response_parsing(PROVIDER_NAME, format!("Invalid stream chunk: {}", e))
    })?;

    if chunk.get("error").is_some() {
        let message = http::error_message(data).unwrap_or_else(|| "Stream error".to_string());
        return Err(ProviderError::streaming(PROVIDER_NAME, message));
    }

    let mut events = Vec::new();
    if let Some(model) = chunk.get("model").and_then(|m| m.as_str()) {
        events.push(StreamEvent::Model(model.to_string()));
    }

    if let Some(choice) = chunk.get("choices").and_then(|c| c.get(0)) {
        if let Some(text) = choice
            .get("delta")
            .and_then(|d| d.get("content"))
            .and_then(|c| c.as_str())
        {
            events.push(StreamEvent::Text(text.to_string()));
        }
        if let Some(reason) = choice.get("finish_reason").and_then(|r| r.as_str()) {
            events.push(StreamEvent::Finish(finish_reason(reason)));
        }
    }

    if let Some(usage) = chunk.get("usage").and_then(parse_usage) {
        events.push(StreamEvent::Usage(usage));
    }

    Ok(events)
}
