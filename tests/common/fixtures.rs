//! Test fixtures and data factories

use jsonwebtoken::{EncodingKey, Header, encode};
use litellm_ws_gateway::GatewayRequest;
use litellm_ws_gateway::auth::{AuthenticatedUser, Claims};
use litellm_ws_gateway::config::{ProviderConfig, ProviderRetryConfig};
use uuid::Uuid;

/// HMAC secret shared by every signed fixture token
pub const TEST_SECRET: &str = "integration_test_secret_0123456789abcdef";

/// A signed token for `user_id` with `role`, valid for ten minutes
pub fn token(user_id: &str, role: &str) -> String {
    token_with_id(user_id, role, &Uuid::new_v4().to_string())
}

pub fn token_with_id(user_id: &str, role: &str, jti: &str) -> String {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = Claims {
        sub: user_id.to_string(),
        email: format!("{}@example.com", user_id),
        role: role.to_string(),
        iat: now,
        exp: now + 600,
        jti: jti.to_string(),
        iss: None,
        aud: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("sign fixture token")
}

pub fn user(id: &str, role: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        role: role.to_string(),
        token_id: Uuid::new_v4().to_string(),
    }
}

/// Chat request frame as a client would send it
pub fn chat_frame(id: &str, model: &str, stream: bool) -> String {
    serde_json::json!({
        "id": id,
        "type": "chat",
        "model": model,
        "messages": [{"role": "user", "content": "Say hello"}],
        "stream": stream,
    })
    .to_string()
}

pub fn chat_request(id: &str, model: &str, stream: bool) -> GatewayRequest {
    serde_json::from_str(&chat_frame(id, model, stream)).expect("valid fixture request")
}

/// Adapter config pointed at a mock backend, with millisecond retries and no buffering
pub fn provider_config(name: &str, provider_type: &str, base_url: &str) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        provider_type: provider_type.to_string(),
        api_key: "test-key".to_string(),
        base_url: Some(base_url.to_string()),
        timeout: 5,
        stream_buffer_size: 1,
        retry: ProviderRetryConfig {
            max_attempts: 3,
            base_delay_ms: 10,
            max_delay_ms: 50,
            backoff_multiplier: 2.0,
            jitter: false,
        },
        ..Default::default()
    }
}
