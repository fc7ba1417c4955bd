//! Core configuration validators
//!
//! GatewayConfig, ServerConfig, ProviderConfig and CreditConfig.

use super::trait_def::Validate;
use crate::config::models::*;
use crate::core::providers::ProviderType;
use std::collections::HashSet;
use tracing::debug;

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating gateway configuration");

        self.server.validate()?;
        self.auth.validate()?;
        self.roles.validate()?;

        if self.providers.is_empty() {
            return Err("At least one provider must be configured".to_string());
        }

        let mut provider_names = HashSet::new();
        for provider in &self.providers {
            if !provider_names.insert(provider.name.as_str()) {
                return Err(format!("Duplicate provider name: {}", provider.name));
            }
            provider.validate()?;
        }

        self.router.validate()?;
        for (field, name) in [
            ("primary", &self.router.primary),
            ("fallback", &self.router.fallback),
        ] {
            if let Some(name) = name {
                if !provider_names.contains(name.as_str()) {
                    return Err(format!(
                        "Router {} '{}' is not a configured provider",
                        field, name
                    ));
                }
            }
        }

        self.credits.validate()?;

        debug!("Gateway configuration validation completed");
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating server configuration");

        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("Worker count must be greater than 0".to_string());
            }
        }

        if self.heartbeat_interval_secs == 0 {
            return Err("Heartbeat interval must be greater than 0".to_string());
        }

        if self.max_frame_size < 1024 {
            return Err("Max frame size must be at least 1 KiB".to_string());
        }

        Ok(())
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Provider name cannot be empty".to_string());
        }

        self.provider_type
            .parse::<ProviderType>()
            .map_err(|e| format!("Provider '{}': {}", self.name, e))?;

        if self.api_key.is_empty() {
            return Err(format!("Provider '{}' has no API key", self.name));
        }

        if let Some(base_url) = &self.base_url {
            url::Url::parse(base_url)
                .map_err(|e| format!("Provider '{}' base_url invalid: {}", self.name, e))?;
        }

        if self.timeout == 0 {
            return Err(format!("Provider '{}' timeout must be > 0", self.name));
        }

        if self.stream_buffer_size == 0 {
            return Err(format!(
                "Provider '{}' stream buffer size must be > 0",
                self.name
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(format!(
                "Provider '{}' retry max_attempts must be at least 1",
                self.name
            ));
        }

        if self.retry.backoff_multiplier < 1.0 {
            return Err(format!(
                "Provider '{}' retry backoff multiplier must be >= 1.0",
                self.name
            ));
        }

        Ok(())
    }
}

impl Validate for CreditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.chars_per_token <= 0.0 {
            return Err("credits.chars_per_token must be greater than 0".to_string());
        }

        if self.default_completion_ratio < 0.0
            || self.completion_ratios.iter().any(|r| r.ratio < 0.0)
        {
            return Err("Completion ratios cannot be negative".to_string());
        }

        if self.default_credits_per_1k_tokens < 0.0
            || self.prices.iter().any(|p| p.credits_per_1k_tokens < 0.0)
        {
            return Err("Prices cannot be negative".to_string());
        }

        if let Some(ledger) = &self.ledger {
            url::Url::parse(&ledger.base_url)
                .map_err(|e| format!("Ledger base_url invalid: {}", e))?;
        }

        Ok(())
    }
}
