//! AI Provider implementations
//!
//! One adapter per backend behind [`LLMProvider`]. Adapters are built from configuration by
//! [`build_provider`] and registered with the router under their configured name.

// Base infrastructure
pub mod base;

// Provider modules
pub mod anthropic;
pub mod gemini;
pub mod openai;

pub mod unified_provider;

use std::str::FromStr;
use std::sync::Arc;

pub use crate::core::traits::LLMProvider;
pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;
pub use unified_provider::{ProviderError, ProviderErrorKind};

use crate::config::ProviderConfig;
use crate::utils::error::{GatewayError, Result};

/// Provider type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    Anthropic,
    Gemini,
}

impl FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "openai-compatible" => Ok(ProviderType::OpenAI),
            "anthropic" | "claude" => Ok(ProviderType::Anthropic),
            "gemini" | "google" | "google-gemini" => Ok(ProviderType::Gemini),
            other => Err(format!("Unknown provider type: {}", other)),
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::OpenAI => write!(f, "openai"),
            ProviderType::Anthropic => write!(f, "anthropic"),
            ProviderType::Gemini => write!(f, "gemini"),
        }
    }
}

/// Build the adapter described by `config`
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn LLMProvider>> {
    let provider_type = ProviderType::from_str(&config.provider_type)
        .map_err(|e| GatewayError::config(format!("Provider '{}': {}", config.name, e)))?;

    let provider: Arc<dyn LLMProvider> = match provider_type {
        ProviderType::OpenAI => Arc::new(OpenAIProvider::new(config)?),
        ProviderType::Anthropic => Arc::new(AnthropicProvider::new(config)?),
        ProviderType::Gemini => Arc::new(GeminiProvider::new(config)?),
    };
    Ok(provider)
}
