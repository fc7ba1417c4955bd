//! Provider configuration

use super::*;
use crate::utils::error::RetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Router-level name, referenced by requests and by `router.primary` / `router.fallback`
    pub name: String,
    /// Adapter kind: `openai`, `anthropic` or `gemini`
    pub provider_type: String,
    /// API key; `${ENV_VAR}` is resolved at load time
    pub api_key: String,
    /// Base URL override
    pub base_url: Option<String>,
    /// Request timeout in seconds, also the deadline for a stream's terminal chunk
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Supported models; empty means the adapter's built-in model families
    #[serde(default)]
    pub models: Vec<String>,
    /// Characters buffered before a streaming chunk is emitted
    #[serde(default = "default_stream_buffer_size")]
    pub stream_buffer_size: usize,
    /// `max_tokens` sent when the client gives none (required by some backends)
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,
    /// Retry configuration for rate-limited calls
    #[serde(default)]
    pub retry: ProviderRetryConfig,
}

fn default_stream_buffer_size() -> usize {
    32
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            provider_type: String::new(),
            api_key: String::new(),
            base_url: None,
            timeout: default_timeout(),
            models: Vec::new(),
            stream_buffer_size: default_stream_buffer_size(),
            default_max_tokens: default_max_tokens(),
            retry: ProviderRetryConfig::default(),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Retry configuration as written in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_true")]
    pub jitter: bool,
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for ProviderRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

impl From<&ProviderRetryConfig> for RetryConfig {
    fn from(config: &ProviderRetryConfig) -> Self {
        RetryConfig {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
            jitter: config.jitter,
        }
    }
}
