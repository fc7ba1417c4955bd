//! OpenAI Provider Module
//!
//! Chat completions API and compatible servers.

pub mod provider;
pub mod streaming;
pub mod transform;

pub use provider::OpenAIProvider;

pub const PROVIDER_NAME: &str = "openai";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model families served when no explicit model list is configured
pub const MODEL_FAMILIES: &[&str] = &["gpt-", "o1", "o3", "o4", "chatgpt-"];
