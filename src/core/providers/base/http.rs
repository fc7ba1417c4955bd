//! HTTP plumbing shared by the adapters
//!
//! Every backend reports failures differently. These helpers fold status codes, transport
//! errors and error bodies into the adapter error taxonomy so each adapter only has to
//! describe its request and response shapes.

use crate::core::providers::unified_provider::ProviderError;
use crate::utils::error::{RetryConfig, RetryOnRateLimit, run_with_recovery};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const POOL_MAX_IDLE_PER_HOST: usize = 16;
const USER_AGENT: &str = concat!("litellm-ws-gateway/", env!("CARGO_PKG_VERSION"));

/// Build a pooled client. No overall request timeout is set on the client itself:
/// streamed bodies are bounded by the stream normalizer's deadline instead.
pub fn build_client(provider: &'static str) -> Result<Client, ProviderError> {
    ClientBuilder::new()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| {
            ProviderError::provider_unavailable(
                provider,
                format!("Failed to create HTTP client: {}", e),
            )
        })
}

/// Map a `reqwest` transport failure
pub fn classify_transport(provider: &'static str, error: &reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::timeout(provider, error.to_string())
    } else if error.is_decode() {
        ProviderError::response_parsing(provider, error.to_string())
    } else {
        ProviderError::provider_unavailable(provider, format!("Network error: {}", error))
    }
}

/// Map a non-success HTTP status and its body
pub fn classify_status(
    provider: &'static str,
    status: StatusCode,
    body: &str,
    model: &str,
    retry_after: Option<u64>,
) -> ProviderError {
    let detail = error_message(body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.to_string()
        } else {
            body.trim().to_string()
        }
    });

    match status.as_u16() {
        401 | 403 => ProviderError::authentication(provider, detail),
        429 => ProviderError::rate_limit_with_message(
            provider,
            detail,
            retry_after.or_else(|| retry_after_from_body(body)),
        ),
        400 | 413 | 422 => ProviderError::invalid_request(provider, detail),
        404 => ProviderError::model_not_found(provider, model),
        408 => ProviderError::timeout(provider, detail),
        // Anthropic reports overload as 529
        500..=599 => ProviderError::provider_unavailable(provider, detail),
        _ => ProviderError::provider_unavailable(
            provider,
            format!("Unexpected status {}: {}", status.as_u16(), detail),
        ),
    }
}

/// Seconds from a `Retry-After` header. HTTP-date values are ignored.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Pull a human readable message out of the usual error body shapes:
/// `{"error":{"message":..}}`, `{"error":"..."}` and `{"message":..}`
pub fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let message = match json.get("error") {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(error) => error.get("message").and_then(|m| m.as_str()),
        None => json.get("message").and_then(|m| m.as_str()),
    }?;
    Some(message.to_string())
}

fn retry_after_from_body(body: &str) -> Option<u64> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("retry_after")
        .or_else(|| json.get("error").and_then(|e| e.get("retry_after")))
        .and_then(|v| v.as_u64())
}

/// Send a prepared request and return the response when the status is a success,
/// otherwise the classified error
pub async fn send(
    provider: &'static str,
    request: reqwest::RequestBuilder,
    model: &str,
) -> Result<Response, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| classify_transport(provider, &e))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = parse_retry_after(response.headers());
    let body = response.text().await.unwrap_or_default();
    Err(classify_status(provider, status, &body, model, retry_after))
}

/// [`send`] bounded by `timeout` until the response headers arrive
pub async fn send_with_deadline(
    provider: &'static str,
    request: reqwest::RequestBuilder,
    model: &str,
    timeout: Duration,
) -> Result<Response, ProviderError> {
    tokio::time::timeout(timeout, send(provider, request, model))
        .await
        .map_err(|_| {
            ProviderError::timeout(
                provider,
                format!("No response within {}s", timeout.as_secs()),
            )
        })?
}

/// Read a success body as JSON
pub async fn read_json(provider: &'static str, response: Response) -> Result<Value, ProviderError> {
    let text = response
        .text()
        .await
        .map_err(|e| classify_transport(provider, &e))?;
    serde_json::from_str(&text).map_err(|e| {
        ProviderError::response_parsing(provider, format!("Failed to parse JSON: {}", e))
    })
}

/// Run one backend call, retrying rate-limited failures with backoff
pub async fn with_rate_limit_retry<T, F, Fut>(
    provider: &'static str,
    retry: &RetryConfig,
    mut call: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let policy = RetryOnRateLimit::new(retry.clone());
    match run_with_recovery(&policy, 1, |_| call()).await {
        Ok(value) => Ok(value),
        Err(exhausted) => {
            let attempts = exhausted.failures.len();
            let last = exhausted.into_last().unwrap_or_else(|| {
                ProviderError::provider_unavailable(provider, "No attempt was made")
            });
            if attempts > 1 {
                warn!(provider, attempts, error = %last, "Backend call failed after retries");
            }
            Err(last)
        }
    }
}
