//! Google Gemini Provider Module

pub mod provider;
pub mod streaming;
pub mod transform;

pub use provider::GeminiProvider;

pub const PROVIDER_NAME: &str = "gemini";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const MODEL_FAMILIES: &[&str] = &["gemini-"];
