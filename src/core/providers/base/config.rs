//! Adapter settings derived from a provider's configuration

use crate::config::ProviderConfig;
use crate::utils::error::RetryConfig;
use std::time::Duration;

/// Settings every adapter shares
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    /// Router-level name this adapter is registered under
    pub name: String,
    pub api_key: String,
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Per-call timeout, and the deadline for a stream's terminal chunk
    pub timeout: Duration,
    /// Configured model list; entries ending in `*` match by prefix
    pub models: Vec<String>,
    pub stream_buffer_size: usize,
    pub default_max_tokens: u32,
    pub retry: RetryConfig,
}

impl AdapterSettings {
    /// Build from config, using `default_base_url` when none is configured
    pub fn from_config(config: &ProviderConfig, default_base_url: &str) -> Self {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(default_base_url)
            .trim_end_matches('/')
            .to_string();

        Self {
            name: config.name.clone(),
            api_key: config.api_key.clone(),
            base_url,
            timeout: config.timeout(),
            models: config.models.clone(),
            stream_buffer_size: config.stream_buffer_size,
            default_max_tokens: config.default_max_tokens,
            retry: RetryConfig::from(&config.retry),
        }
    }

    /// Whether `model` is served. With no configured list the adapter's built-in
    /// family prefixes decide.
    pub fn supports_model(&self, model: &str, families: &[&str]) -> bool {
        if self.models.is_empty() {
            return families.iter().any(|prefix| model.starts_with(prefix));
        }
        self.models.iter().any(|entry| match entry.strip_suffix('*') {
            Some(prefix) => model.starts_with(prefix),
            None => entry == model,
        })
    }

    /// Join a path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(models: Vec<&str>, base_url: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            name: "openai-main".to_string(),
            provider_type: "openai".to_string(),
            api_key: "sk-test".to_string(),
            base_url: base_url.map(str::to_string),
            models: models.into_iter().map(str::to_string).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_base_url_default_and_override() {
        let settings = AdapterSettings::from_config(&config(vec![], None), "https://api.openai.com/v1");
        assert_eq!(settings.url("/chat/completions"), "https://api.openai.com/v1/chat/completions");

        let settings =
            AdapterSettings::from_config(&config(vec![], Some("http://localhost:9000/")), "unused");
        assert_eq!(settings.url("chat/completions"), "http://localhost:9000/chat/completions");
    }

    #[test]
    fn test_model_support_families() {
        let settings = AdapterSettings::from_config(&config(vec![], None), "x");
        assert!(settings.supports_model("gpt-4o", &["gpt-", "o1"]));
        assert!(!settings.supports_model("claude-3-opus", &["gpt-", "o1"]));
    }

    #[test]
    fn test_model_support_configured_list() {
        let settings =
            AdapterSettings::from_config(&config(vec!["gpt-4", "gpt-3.5-turbo*"], None), "x");
        assert!(settings.supports_model("gpt-4", &["gpt-"]));
        assert!(!settings.supports_model("gpt-4o", &["gpt-"]));
        assert!(settings.supports_model("gpt-3.5-turbo-0125", &["gpt-"]));
    }

    #[test]
    fn test_retry_settings_carried() {
        let settings = AdapterSettings::from_config(&config(vec![], None), "x");
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.stream_buffer_size, 32);
    }
}
