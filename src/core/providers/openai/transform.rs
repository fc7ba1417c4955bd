//! OpenAI request/response mapping

use super::PROVIDER_NAME;
use super::streaming::finish_reason;
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{ChatResponse, FinishReason, GatewayRequest, Usage};
use serde_json::{Map, Value, json};

/// Chat completions body. System messages stay inline.
pub fn build_request_body(request: &GatewayRequest) -> Value {
    let messages: Vec<Value> = request
        .messages
        .iter()
        .map(|m| json!({ "role": m.role.to_string(), "content": m.content }))
        .collect();

    let mut body = Map::new();
    body.insert("model".into(), json!(request.model));
    body.insert("messages".into(), Value::Array(messages));

    let p = &request.params;
    if let Some(max_tokens) = p.max_tokens {
        body.insert("max_tokens".into(), json!(max_tokens));
    }
    if let Some(t) = p.temperature {
        body.insert("temperature".into(), json!(t));
    }
    if let Some(top_p) = p.top_p {
        body.insert("top_p".into(), json!(top_p));
    }
    if let Some(fp) = p.frequency_penalty {
        body.insert("frequency_penalty".into(), json!(fp));
    }
    if let Some(pp) = p.presence_penalty {
        body.insert("presence_penalty".into(), json!(pp));
    }
    if let Some(stop) = &p.stop {
        body.insert("stop".into(), json!(stop));
    }

    if request.stream {
        body.insert("stream".into(), json!(true));
        // usage arrives in a trailing chunk with empty choices
        body.insert("stream_options".into(), json!({ "include_usage": true }));
    }

    Value::Object(body)
}

/// Map a non-streamed completion
pub fn parse_response(body: &Value, requested_model: &str) -> Result<ChatResponse, ProviderError> {
    let choice = body
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| ProviderError::response_parsing(PROVIDER_NAME, "Response has no choices"))?;

    let content = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string();

    let finish_reason = choice
        .get("finish_reason")
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

/// `{"prompt_tokens","completion_tokens"}`; the total is recomputed
pub fn parse_usage(usage: &Value) -> Option<Usage> {
    let prompt = usage.get("prompt_tokens").and_then(|v| v.as_u64())?;
    let completion = usage
        .get("completion_tokens")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);
    Some(Usage::new(
        u32::try_from(prompt).unwrap_or(u32::MAX),
        u32::try_from(completion).unwrap_or(u32::MAX),
    ))
}
