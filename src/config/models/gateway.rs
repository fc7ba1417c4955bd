//! Main gateway configuration

#![allow(missing_docs)]

use super::*;
use serde::{Deserialize, Serialize};

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Role capability matrix
    #[serde(default)]
    pub roles: RolesConfig,
    /// Provider configurations
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    /// Router configuration
    #[serde(default)]
    pub router: RouterConfig,
    /// Credit estimation and ledger
    #[serde(default)]
    pub credits: CreditConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    /// Replace `${ENV_VAR}` placeholders in secrets with their environment values
    pub fn resolve_env(&mut self) -> Result<(), String> {
        self.auth.jwt_secret = resolve_env_placeholder(&self.auth.jwt_secret)
            .map_err(|e| format!("auth.jwt_secret: {}", e))?;

        for provider in &mut self.providers {
            provider.api_key = resolve_env_placeholder(&provider.api_key)
                .map_err(|e| format!("providers.{}.api_key: {}", provider.name, e))?;
        }

        if let Some(ledger) = self.credits.ledger.as_mut() {
            if let Some(token) = ledger.service_token.as_ref() {
                ledger.service_token = Some(
                    resolve_env_placeholder(token)
                        .map_err(|e| format!("credits.ledger.service_token: {}", e))?,
                );
            }
        }

        Ok(())
    }

    /// Find a provider by router-level name
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }
}
