//! Gemini generateContent mapping

use super::PROVIDER_NAME;
use super::streaming::finish_reason;
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{
    ChatResponse, FinishReason, GatewayRequest, MessageRole, Usage, split_system_messages,
};
use serde_json::{Map, Value, json};

/// generateContent body. System messages go to `systemInstruction`; assistant turns use
/// the `model` role.
pub fn build_request_body(request: &GatewayRequest) -> Value {
    let (system, conversation) = split_system_messages(&request.messages);

    let contents: Vec<Value> = conversation
        .into_iter()
        .map(|m| {
            let role = match m.role {
                MessageRole::Assistant => "model",
                _ => "user",
            };
            json!({ "role": role, "parts": [{ "text": m.content }] })
        })
        .collect();

    let mut body = Map::new();
    body.insert("contents".into(), Value::Array(contents));
    if let Some(system) = system {
        body.insert(
            "systemInstruction".into(),
            json!({ "parts": [{ "text": system }] }),
        );
    }

    let p = &request.params;
    let mut generation = Map::new();
    if let Some(max_tokens) = p.max_tokens {
        generation.insert("maxOutputTokens".into(), json!(max_tokens));
    }
    if let Some(t) = p.temperature {
        generation.insert("temperature".into(), json!(t));
    }
    if let Some(top_p) = p.top_p {
        generation.insert("topP".into(), json!(top_p));
    }
    if let Some(fp) = p.frequency_penalty {
        generation.insert("frequencyPenalty".into(), json!(fp));
    }
    if let Some(pp) = p.presence_penalty {
        generation.insert("presencePenalty".into(), json!(pp));
    }
    if let Some(stop) = &p.stop {
        generation.insert("stopSequences".into(), json!(stop));
    }
    if !generation.is_empty() {
        body.insert("generationConfig".into(), Value::Object(generation));
    }

    Value::Object(body)
}

/// Concatenated text parts of the first candidate
pub fn candidate_text(candidate: &Value) -> String {
    candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default()
}

/// Map a non-streamed response
pub fn parse_response(body: &Value, requested_model: &str) -> Result<ChatResponse, ProviderError> {
    let candidate = body
        .get("candidates")
        .and_then(|c| c.get(0))
        .ok_or_else(|| match prompt_block_reason(body) {
            Some(reason) => ProviderError::invalid_request(
                PROVIDER_NAME,
                format!("Prompt blocked: {}", reason),
            ),
            None => ProviderError::response_parsing(PROVIDER_NAME, "Response has no candidates"),
        })?;

    let finish_reason = candidate
        .get("finishReason")
        .and_then(|r| r.as_str())
        .map(finish_reason)
        .unwrap_or(FinishReason::Incomplete);

    Ok(ChatResponse {
        model: body
            .get("modelVersion")
            .and_then(|m| m.as_str())
            .unwrap_or(requested_model)
            .to_string(),
        content: candidate_text(candidate),
        finish_reason,
        usage: body.get("usageMetadata").and_then(parse_usage),
    })
}

fn prompt_block_reason(body: &Value) -> Option<&str> {
    body.get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str())
}

/// `usageMetadata`; the total is recomputed from its parts
pub fn parse_usage(usage: &Value) -> Option<Usage> {
    let prompt = usage.get("promptTokenCount").and_then(|v| v.as_u64())?;
    let completion = usage
        .get("candidatesTokenCount")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);
    Some(Usage::new(
        u32::try_from(prompt).unwrap_or(u32::MAX),
        u32::try_from(completion).unwrap_or(u32::MAX),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ChatMessage, ProviderSelection, RequestType, SamplingParams};

    #[test]
    fn test_system_instruction_and_roles() {
        let request = GatewayRequest {
            id: "req-1".to_string(),
            request_type: RequestType::Completion,
            provider: ProviderSelection::Auto,
            model: "gemini-1.5-pro".to_string(),
            messages: vec![
                ChatMessage::system("Answer in French."),
                ChatMessage::user("Hello"),
                ChatMessage::assistant("Bonjour"),
            ],
            stream: false,
            params: SamplingParams {
                max_tokens: Some(100),
                top_p: Some(0.9),
                ..Default::default()
            },
        };
        let body = build_request_body(&request);
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "Answer in French."
        );
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 100);
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_parse_response() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Salut"}, {"text": "!"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 8, "candidatesTokenCount": 2, "totalTokenCount": 10},
            "modelVersion": "gemini-1.5-pro-002"
        });
        let response = parse_response(&body, "gemini-1.5-pro").unwrap();
        assert_eq!(response.content, "Salut!");
        assert_eq!(response.model, "gemini-1.5-pro-002");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage, Some(Usage::new(8, 2)));
    }

    #[test]
    fn test_blocked_prompt() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = parse_response(&body, "gemini-1.5-pro").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest { .. }));
    }
}
