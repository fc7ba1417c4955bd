//! Gemini streamGenerateContent (`alt=sse`) decoding

use super::PROVIDER_NAME;
use super::transform::candidate_text;
use crate::core::providers::base::{SseEvent, http};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::streaming::StreamEvent;
use crate::core::types::FinishReason;
use serde_json::Value;

pub fn finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
            FinishReason::ContentFilter
        }
        "MALFORMED_FUNCTION_CALL" => FinishReason::ToolCalls,
        "FINISH_REASON_UNSPECIFIED" => FinishReason::Incomplete,
        _ => FinishReason::Stop,
    }
}

/// Decode one streamed `GenerateContentResponse`. Every event carries cumulative
/// `usageMetadata`, so later values replace earlier ones.
pub fn parse_event(event: &SseEvent) -> Result<Vec<StreamEvent>, ProviderError> {
    let json: Value = serde_json::from_str(&event.data).map_err(|e| {
        ProviderError::response_parsing(PROVIDER_NAME, format!("Invalid stream chunk: {}", e))
    })?;

    if json.get("error").is_some() {
        let message =
            http::error_message(&event.data).unwrap_or_else(|| "Stream error".to_string());
        return Err(ProviderError::streaming(PROVIDER_NAME, message));
    }

    let mut events = Vec::new();
    if let Some(model) = json.get("modelVersion").and_then(|m| m.as_str()) {
        events.push(StreamEvent::Model(model.to_string()));
    }

    if let Some(candidate) = json.get("candidates").and_then(|c| c.get(0)) {
        let text = candidate_text(candidate);
        if !text.is_empty() {
            events.push(StreamEvent::Text(text));
        }
        if let Some(reason) = candidate.get("finishReason").and_then(|r| r.as_str()) {
            events.push(StreamEvent::Finish(finish_reason(reason)));
        }
    }

    if let Some(usage) = json.get("usageMetadata") {
        let count = |key: &str| {
            usage
                .get(key)
                .and_then(|v| v.as_u64())
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        };
        if let Some(prompt) = count("promptTokenCount") {
            events.push(StreamEvent::PromptTokens(prompt));
        }
        if let Some(completion) = count("candidatesTokenCount") {
            events.push(StreamEvent::CompletionTokens(completion));
        }
    }

    Ok(events)
}
