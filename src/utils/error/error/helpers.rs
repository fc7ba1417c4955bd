//! Helper functions for creating specific error types

use super::types::GatewayError;
use crate::core::providers::unified_provider::ProviderError;

/// Helper functions for creating specific errors
impl GatewayError {
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth(message.into())
    }

    pub fn authorization<S: Into<String>>(message: S) -> Self {
        Self::Authorization(message.into())
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn ledger<S: Into<String>>(message: S) -> Self {
        Self::Ledger(message.into())
    }

    pub fn cancelled<S: Into<String>>(message: S) -> Self {
        Self::Cancelled(message.into())
    }

    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Stable machine-readable code sent to clients in `error` messages
    pub fn client_code(&self) -> &'static str {
        match self {
            Self::Auth(_) | Self::Jwt(_) => "unauthorized",
            Self::Authorization(_) => "authorization_denied",
            Self::RateLimited { .. } => "rate_limited",
            Self::InsufficientCredits { .. } => "insufficient_credits",
            Self::Ledger(_) => "billing_unavailable",
            Self::Provider(e) => e.client_code(),
            Self::AllProvidersUnavailable { .. } => "all_providers_unavailable",
            Self::ProviderNotFound(_) => "provider_not_found",
            Self::Validation(_) | Self::BadRequest(_) | Self::Serialization(_) => {
                "invalid_request"
            }
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "duplicate_request",
            Self::Cancelled(_) => "cancelled",
            Self::Config(_)
            | Self::HttpClient(_)
            | Self::Yaml(_)
            | Self::Io(_)
            | Self::Transport(_)
            | Self::Internal(_) => "internal_error",
        }
    }

    /// Whether the same request may succeed if the client sends it again later
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Ledger(_) | Self::AllProvidersUnavailable { .. } => {
                true
            }
            Self::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        GatewayError::Provider(err)
    }
}
