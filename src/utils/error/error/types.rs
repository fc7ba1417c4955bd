//! Error types for the Gateway

use crate::core::providers::unified_provider::ProviderError;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for the Gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// One failed attempt against a named provider, kept for aggregate router errors
#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    /// Router-level provider name
    pub provider: String,
    /// What the provider (or its breaker) reported
    pub error: ProviderError,
}

impl std::fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

/// Main error type for the Gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing, invalid, expired or revoked credential
    #[error("Authentication error: {0}")]
    Auth(String),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Model, feature or token-ceiling violation
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Per-user request or token rate exceeded
    #[error("Rate limit exceeded: {reason}")]
    RateLimited {
        reason: String,
        reset_time: DateTime<Utc>,
    },

    /// Balance does not cover the estimated cost, or the ledger could not be asked
    #[error("Insufficient credits: {reason}")]
    InsufficientCredits {
        reason: String,
        required: f64,
        available: Option<f64>,
    },

    /// External ledger call failed
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Provider errors
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    /// Every candidate provider of an auto-routed request failed
    #[error("All providers unavailable: {}", format_attempts(.attempts))]
    AllProvidersUnavailable { attempts: Vec<ProviderAttempt> },

    /// Provider not found
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request was cancelled by the client or by disconnect
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Outbound write to the client transport failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

fn format_attempts(attempts: &[ProviderAttempt]) -> String {
    if attempts.is_empty() {
        return "no providers attempted".to_string();
    }
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
