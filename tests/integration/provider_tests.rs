//! Provider adapter integration tests
//!
//! Each adapter talks to a `wiremock` server standing in for its backend.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{chat_request, provider_config};
    use futures::StreamExt;
    use litellm_ws_gateway::core::providers::{
        AnthropicProvider, GeminiProvider, OpenAIProvider, ProviderErrorKind, build_provider,
    };
    use litellm_ws_gateway::core::types::{FinishReason, ResponseChunk, StreamSummary};
    use litellm_ws_gateway::{LLMProvider, ProviderError, ProviderResponse, Usage};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse(events: &[(Option<&str>, serde_json::Value)]) -> String {
        events
            .iter()
            .map(|(event, data)| match event {
                Some(name) => format!("event: {}\ndata: {}\n\n", name, data),
                None => format!("data: {}\n\n", data),
            })
            .collect()
    }

    /// Concatenated content and the terminal summary of a normalized stream
    async fn collect(response: ProviderResponse) -> (String, StreamSummary) {
        let ProviderResponse::Stream(mut stream) = response else {
            panic!("expected a stream");
        };
        let mut content = String::new();
        let mut summary = None;
        while let Some(item) = stream.next().await {
            match item.expect("stream item") {
                ResponseChunk::Content(text) => {
                    assert!(summary.is_none(), "content after Done");
                    content.push_str(&text);
                }
                ResponseChunk::Done(done) => {
                    assert!(summary.is_none(), "second Done");
                    summary = Some(done);
                }
            }
        }
        (content, summary.expect("stream ended without Done"))
    }

    fn complete(response: ProviderResponse) -> litellm_ws_gateway::core::types::ChatResponse {
        match response {
            ProviderResponse::Complete(response) => response,
            other => panic!("expected a complete response, got {:?}", other),
        }
    }

    // ==================== OpenAI Tests ====================

    #[tokio::test]
    async fn test_openai_complete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "model": "gpt-4o-mini-2024-07-18",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hello!"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 9, "completion_tokens": 2, "total_tokens": 11}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new(&provider_config("openai", "openai", &server.uri())).unwrap();
        let response = complete(
            provider
                .execute(&chat_request("r1", "gpt-4o-mini", false))
                .await
                .unwrap(),
        );

        assert_eq!(response.content, "Hello!");
        assert_eq!(response.model, "gpt-4o-mini-2024-07-18");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage, Some(Usage::new(9, 2)));
    }

    #[tokio::test]
    async fn test_openai_stream() {
        let server = MockServer::start().await;
        let mut body = sse(&[
            (None, json!({"model": "gpt-4o", "choices": [{"delta": {"content": "Hel"}, "finish_reason": null}]})),
            (None, json!({"model": "gpt-4o", "choices": [{"delta": {"content": "lo"}, "finish_reason": null}]})),
            (None, json!({"model": "gpt-4o", "choices": [{"delta": {}, "finish_reason": "length"}]})),
            (None, json!({"model": "gpt-4o", "choices": [], "usage": {"prompt_tokens": 5, "completion_tokens": 2}})),
        ]);
        body.push_str("data: [DONE]\n\n");
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new(&provider_config("openai", "openai", &server.uri())).unwrap();
        let response = provider
            .execute(&chat_request("r2", "gpt-4o", true))
            .await
            .unwrap();
        let (content, summary) = collect(response).await;

        assert_eq!(content, "Hello");
        assert_eq!(summary.finish_reason, FinishReason::Length);
        assert_eq!(summary.usage, Some(Usage::new(5, 2)));
    }

    #[tokio::test]
    async fn test_openai_rate_limit_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(json!({"error": {"message": "Rate limit reached"}})),
            )
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4",
                "choices": [{"message": {"content": "ok"}, "finish_reason": "stop"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new(&provider_config("openai", "openai", &server.uri())).unwrap();
        let response = complete(
            provider
                .execute(&chat_request("r3", "gpt-4", false))
                .await
                .unwrap(),
        );
        assert_eq!(response.content, "ok");
        assert_eq!(response.usage, None);
    }

    #[tokio::test]
    async fn test_openai_rate_limit_exhausts_budget() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new(&provider_config("openai", "openai", &server.uri())).unwrap();
        let err = provider
            .execute(&chat_request("r4", "gpt-4", false))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn test_openai_auth_failure_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"error": {"message": "Incorrect API key provided"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new(&provider_config("openai", "openai", &server.uri())).unwrap();
        let err = provider
            .execute(&chat_request("r5", "gpt-4", false))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Authentication { .. }));
        assert!(err.to_string().contains("Incorrect API key"));
    }

    // ==================== Anthropic Tests ====================

    #[tokio::test]
    async fn test_anthropic_complete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "type": "message",
                "model": "claude-3-haiku-20240307",
                "content": [{"type": "text", "text": "Hi there"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 12, "output_tokens": 3}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            AnthropicProvider::new(&provider_config("anthropic", "anthropic", &server.uri())).unwrap();
        let response = complete(
            provider
                .execute(&chat_request("a1", "claude-3-haiku-20240307", false))
                .await
                .unwrap(),
        );

        assert_eq!(response.content, "Hi there");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage, Some(Usage::new(12, 3)));
    }

    #[tokio::test]
    async fn test_anthropic_stream_merges_usage() {
        let server = MockServer::start().await;
        let body = sse(&[
            (
                Some("message_start"),
                json!({"type": "message_start", "message": {"model": "claude-3-5-sonnet-20241022", "usage": {"input_tokens": 20, "output_tokens": 1}}}),
            ),
            (Some("ping"), json!({"type": "ping"})),
            (
                Some("content_block_delta"),
                json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Bonjour"}}),
            ),
            (
                Some("content_block_delta"),
                json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": " monde"}}),
            ),
            (
                Some("message_delta"),
                json!({"type": "message_delta", "delta": {"stop_reason": "max_tokens"}, "usage": {"output_tokens": 6}}),
            ),
            (Some("message_stop"), json!({"type": "message_stop"})),
        ]);
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let provider =
            AnthropicProvider::new(&provider_config("anthropic", "anthropic", &server.uri())).unwrap();
        let response = provider
            .execute(&chat_request("a2", "claude-3-5-sonnet-20241022", true))
            .await
            .unwrap();
        let (content, summary) = collect(response).await;

        assert_eq!(content, "Bonjour monde");
        assert_eq!(summary.model, "claude-3-5-sonnet-20241022");
        assert_eq!(summary.finish_reason, FinishReason::Length);
        assert_eq!(summary.usage, Some(Usage::new(20, 6)));
    }

    #[tokio::test]
    async fn test_anthropic_overload_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_json(
                json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            AnthropicProvider::new(&provider_config("anthropic", "anthropic", &server.uri())).unwrap();
        let err = provider
            .execute(&chat_request("a3", "claude-3-haiku-20240307", false))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Unavailable);
    }

    // ==================== Gemini Tests ====================

    #[tokio::test]
    async fn test_gemini_complete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Hola"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 1, "totalTokenCount": 5},
                "modelVersion": "gemini-1.5-flash-002"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&provider_config("gemini", "gemini", &server.uri())).unwrap();
        let response = complete(
            provider
                .execute(&chat_request("g1", "gemini-1.5-flash", false))
                .await
                .unwrap(),
        );

        assert_eq!(response.content, "Hola");
        assert_eq!(response.model, "gemini-1.5-flash-002");
        assert_eq!(response.usage, Some(Usage::new(4, 1)));
    }

    #[tokio::test]
    async fn test_gemini_stream() {
        let server = MockServer::start().await;
        let body = sse(&[
            (
                None,
                json!({"candidates": [{"content": {"parts": [{"text": "Un"}]}}], "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 1}}),
            ),
            (
                None,
                json!({"candidates": [{"content": {"parts": [{"text": " deux"}]}, "finishReason": "STOP"}], "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2}}),
            ),
        ]);
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-pro:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&provider_config("gemini", "gemini", &server.uri())).unwrap();
        let response = provider
            .execute(&chat_request("g2", "gemini-1.5-pro", true))
            .await
            .unwrap();
        let (content, summary) = collect(response).await;

        assert_eq!(content, "Un deux");
        assert_eq!(summary.finish_reason, FinishReason::Stop);
        assert_eq!(summary.usage, Some(Usage::new(3, 2)));
    }

    #[tokio::test]
    async fn test_stream_without_finish_is_incomplete() {
        let server = MockServer::start().await;
        let body = sse(&[(
            None,
            json!({"candidates": [{"content": {"parts": [{"text": "cut"}]}}]}),
        )]);
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&provider_config("gemini", "gemini", &server.uri())).unwrap();
        let response = provider
            .execute(&chat_request("g3", "gemini-1.5-pro", true))
            .await
            .unwrap();
        let (content, summary) = collect(response).await;
        assert_eq!(content, "cut");
        assert_eq!(summary.finish_reason, FinishReason::Incomplete);
    }

    // ==================== Factory Tests ====================

    #[tokio::test]
    async fn test_build_provider_by_type() {
        for (kind, family) in [("openai", "openai"), ("claude", "anthropic"), ("google", "gemini")] {
            let provider = build_provider(&provider_config("p", kind, "http://localhost:1")).unwrap();
            assert_eq!(provider.name(), family);
        }
        assert!(build_provider(&provider_config("p", "cohere", "http://localhost:1")).is_err());
    }
}
