//! Anthropic messages API mapping

use super::PROVIDER_NAME;
use super::streaming::finish_reason;
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{
    ChatResponse, FinishReason, GatewayRequest, MessageRole, Usage, split_system_messages,
};
use serde_json::{Map, Value, json};

/// Messages body. System messages are lifted into the top-level `system` field;
/// `max_tokens` is mandatory for this API so the configured default fills in.
pub fn build_request_body(request: &GatewayRequest, default_max_tokens: u32) -> Value {
    let (system, conversation) = split_system_messages(&request.messages);

    let messages: Vec<Value> = conversation
        .into_iter()
        .map(|m| {
            let role = match m.role {
                MessageRole::Assistant => "assistant",
                _ => "user",
            };
            json!({ "role": role, "content": m.content })
        })
        .collect();

    let p = &request.params;
    let mut body = Map::new();
    body.insert("model".into(), json!(request.model));
    body.insert("messages".into(), Value::Array(messages));
    body.insert(
        "max_tokens".into(),
        json!(p.max_tokens.unwrap_or(default_max_tokens)),
    );
    if let Some(system) = system {
        body.insert("system".into(), json!(system));
    }
    if let Some(t) = p.temperature {
        // accepted range is 0..=1
        body.insert("temperature".into(), json!(t.min(1.0)));
    }
    if let Some(top_p) = p.top_p {
        body.insert("top_p".into(), json!(top_p));
    }
    if let Some(stop) = &p.stop {
        body.insert("stop_sequences".into(), json!(stop));
    }
    if request.stream {
        body.insert("stream".into(), json!(true));
    }

    Value::Object(body)
}

/// Map a non-streamed message
pub fn parse_response(body: &Value, requested_model: &str) -> Result<ChatResponse, ProviderError> {
    let blocks = body
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| ProviderError::response_parsing(PROVIDER_NAME, "Response has no content"))?;

    let content: String = blocks
        .iter()
        .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
        .collect();

    let finish_reason = body
        .get("stop_reason")
        .and_then(|r| r.as_str())
        .map(finish_reason)
        .unwrap_or(FinishReason::Incomplete);

    Ok(ChatResponse {
        model: body
            .get("model")
            .and_then(|m| m.as_str())
            .unwrap_or(requested_model)
            .to_string(),
        content,
        finish_reason,
        usage: body.get("usage").and_then(parse_usage),
    })
}

/// `{"input_tokens","output_tokens"}`
pub fn parse_usage(usage: &Value) -> Option<Usage> {
    let input = usage.get("input_tokens").and_then(|v| v.as_u64())?;
    let output = usage
        .get("output_tokens")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);
    Some(Usage::new(
        u32::try_from(input).unwrap_or(u32::MAX),
        u32::try_from(output).unwrap_or(u32::MAX),
    ))
}
