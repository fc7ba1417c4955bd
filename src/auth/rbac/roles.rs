//! Built-in capability matrix

use super::types::{RateLimitSpec, RoleCapability};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Roles used when the configuration does not override the matrix. `trial` is the most
/// restrictive and is the default for unknown roles.
pub fn default_capabilities() -> Vec<RoleCapability> {
    vec![
        RoleCapability {
            name: "superadmin".to_string(),
            permissions: strings(&["*"]),
            allowed_models: strings(&["*"]),
            features: strings(&["*"]),
            max_tokens_per_request: u32::MAX,
            rate_limit: RateLimitSpec {
                requests_per_minute: u32::MAX,
                tokens_per_minute: u64::MAX,
            },
        },
        RoleCapability {
            name: "admin".to_string(),
            permissions: strings(&["gateway:*", "models:*", "usage:*"]),
            allowed_models: strings(&["*"]),
            features: strings(&["*"]),
            max_tokens_per_request: 32_768,
            rate_limit: RateLimitSpec {
                requests_per_minute: 600,
                tokens_per_minute: 2_000_000,
            },
        },
        RoleCapability {
            name: "developer".to_string(),
            permissions: strings(&["models:read", "usage:read"]),
            allowed_models: strings(&["gpt-4*", "gpt-3.5-turbo*", "claude-3*", "gemini-1.5*"]),
            features: strings(&["chat", "completion"]),
            max_tokens_per_request: 8_192,
            rate_limit: RateLimitSpec {
                requests_per_minute: 120,
                tokens_per_minute: 400_000,
            },
        },
        RoleCapability {
            name: "user".to_string(),
            permissions: strings(&["models:read"]),
            allowed_models: strings(&[
                "gpt-4o-mini",
                "gpt-3.5-turbo",
                "claude-3-haiku-20240307",
                "gemini-1.5-flash",
            ]),
            features: strings(&["chat", "completion"]),
            max_tokens_per_request: 4_096,
            rate_limit: RateLimitSpec {
                requests_per_minute: 60,
                tokens_per_minute: 100_000,
            },
        },
        RoleCapability {
            name: "trial".to_string(),
            permissions: Vec::new(),
            allowed_models: strings(&["gpt-3.5-turbo"]),
            features: strings(&["chat"]),
            max_tokens_per_request: 1_024,
            rate_limit: RateLimitSpec {
                requests_per_minute: 10,
                tokens_per_minute: 10_000,
            },
        },
    ]
}
