//! Anthropic Provider Module

pub mod provider;
pub mod streaming;
pub mod transform;

pub use provider::AnthropicProvider;

pub const PROVIDER_NAME: &str = "anthropic";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";

pub const MODEL_FAMILIES: &[&str] = &["claude-"];
