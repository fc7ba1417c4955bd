//! Anthropic Provider

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{API_VERSION, DEFAULT_BASE_URL, MODEL_FAMILIES, PROVIDER_NAME, streaming, transform};
use crate::config::ProviderConfig;
use crate::core::providers::base::{AdapterSettings, decode_with, http, sse_events};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::streaming::{StreamingConfig, normalize};
use crate::core::traits::LLMProvider;
use crate::core::types::{GatewayRequest, ProviderResponse};

/// Anthropic messages API adapter
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    settings: AdapterSettings,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Self::with_settings(AdapterSettings::from_config(config, DEFAULT_BASE_URL))
    }

    pub fn with_settings(settings: AdapterSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::build_client(PROVIDER_NAME)?,
            settings,
        })
    }

    async fn send_once(
        &self,
        request: &GatewayRequest,
        body: &Value,
    ) -> Result<ProviderResponse, ProviderError> {
        let mut builder = self
            .client
            .post(self.settings.url("v1/messages"))
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body);
        if !request.stream {
            builder = builder.timeout(self.settings.timeout);
        }

        let response = http::send_with_deadline(
            PROVIDER_NAME,
            builder,
            &request.model,
            self.settings.timeout,
        )
        .await?;

        if request.stream {
            let events = decode_with(
                sse_events(PROVIDER_NAME, response.bytes_stream()),
                streaming::parse_event,
            );
            let config = StreamingConfig {
                buffer_size: self.settings.stream_buffer_size,
                timeout: self.settings.timeout,
            };
            return Ok(ProviderResponse::Stream(normalize(
                events,
                request.model.clone(),
                config,
            )));
        }

        let json = http::read_json(PROVIDER_NAME, response).await?;
        transform::parse_response(&json, &request.model).map(ProviderResponse::Complete)
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn supports_model(&self, model: &str) -> bool {
        self.settings.supports_model(model, MODEL_FAMILIES)
    }

    async fn execute(&self, request: &GatewayRequest) -> Result<ProviderResponse, ProviderError> {
        if !self.supports_model(&request.model) {
            return Err(ProviderError::unsupported_model(
                PROVIDER_NAME,
                &request.model,
            ));
        }

        let body = transform::build_request_body(request, self.settings.default_max_tokens);
        debug!(
            provider = %self.settings.name,
            model = %request.model,
            request_id = %request.id,
            stream = request.stream,
            "Sending Anthropic request"
        );

        http::with_rate_limit_retry(PROVIDER_NAME, &self.settings.retry, || {
            self.send_once(request, &body)
        })
        .await
    }
}
