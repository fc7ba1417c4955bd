//! Unified Provider Error Handling
//!
//! One error type for every adapter. Backend failures are classified into a small set of
//! categories so the router, the retry policy and the client protocol can all reason about them
//! without knowing which backend produced them.
//!
//! | Variant | Trigger | Retried by adapter | Retryable by client |
//! |------|------|------------|--------|
//! | Authentication | 401/403 from backend | No | No |
//! | RateLimit | 429 from backend | Yes (bounded, with backoff) | Yes |
//! | InvalidRequest | 400/422 from backend | No | No |
//! | ModelNotFound | 404 from backend | No | No |
//! | UnsupportedModel | model rejected before any call | No | No |
//! | ProviderUnavailable | 5xx, connect failure | No | Yes |
//! | Timeout | request deadline elapsed | No | Yes |
//! | CircuitOpen | breaker rejected the call | No | Yes |
//! | ResponseParsing / Streaming | malformed backend payload | No | Yes |

/// Unified provider error type
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Authentication failed for {provider}: {message}")]
    Authentication {
        provider: &'static str,
        message: String,
    },

    #[error("Rate limit exceeded for {provider}: {message}")]
    RateLimit {
        provider: &'static str,
        message: String,
        /// Seconds the backend asked us to wait, when it said so
        retry_after: Option<u64>,
    },

    #[error("Invalid request for {provider}: {message}")]
    InvalidRequest {
        provider: &'static str,
        message: String,
    },

    #[error("Model '{model}' not found for {provider}")]
    ModelNotFound {
        provider: &'static str,
        model: String,
    },

    #[error("Model '{model}' is not supported by {provider}")]
    UnsupportedModel {
        provider: &'static str,
        model: String,
    },

    #[error("Provider {provider} is unavailable: {message}")]
    ProviderUnavailable {
        provider: &'static str,
        message: String,
    },

    #[error("Timeout for {provider}: {message}")]
    Timeout {
        provider: &'static str,
        message: String,
    },

    #[error("Circuit breaker for provider '{provider}' is open")]
    CircuitOpen { provider: String },

    #[error("Failed to parse {provider} response: {message}")]
    ResponseParsing {
        provider: &'static str,
        message: String,
    },

    #[error("Streaming error for {provider}: {message}")]
    Streaming {
        provider: &'static str,
        message: String,
    },
}

/// Coarse category used by recovery policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    ModelNotFound,
    Unavailable,
}

impl ProviderError {
    pub fn authentication(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider,
            message: message.into(),
        }
    }

    pub fn rate_limit(provider: &'static str, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            provider,
            message: match retry_after {
                Some(secs) => format!("Rate limit exceeded. Retry after {} seconds", secs),
                None => "Rate limit exceeded".to_string(),
            },
            retry_after,
        }
    }

    pub fn rate_limit_with_message(
        provider: &'static str,
        message: impl Into<String>,
        retry_after: Option<u64>,
    ) -> Self {
        Self::RateLimit {
            provider,
            message: message.into(),
            retry_after,
        }
    }

    pub fn invalid_request(provider: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            provider,
            message: message.into(),
        }
    }

    pub fn model_not_found(provider: &'static str, model: impl Into<String>) -> Self {
        Self::ModelNotFound {
            provider,
            model: model.into(),
        }
    }

    pub fn unsupported_model(provider: &'static str, model: impl Into<String>) -> Self {
        Self::UnsupportedModel {
            provider,
            model: model.into(),
        }
    }

    pub fn provider_unavailable(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider,
            message: message.into(),
        }
    }

    pub fn timeout(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider,
            message: message.into(),
        }
    }

    pub fn circuit_open(provider: impl Into<String>) -> Self {
        Self::CircuitOpen {
            provider: provider.into(),
        }
    }

    pub fn response_parsing(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ResponseParsing {
            provider,
            message: message.into(),
        }
    }

    pub fn streaming(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Streaming {
            provider,
            message: message.into(),
        }
    }

    /// Classification used by recovery policies
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::Authentication { .. } => ProviderErrorKind::Authentication,
            Self::RateLimit { .. } => ProviderErrorKind::RateLimited,
            Self::InvalidRequest { .. } | Self::UnsupportedModel { .. } => {
                ProviderErrorKind::InvalidRequest
            }
            Self::ModelNotFound { .. } => ProviderErrorKind::ModelNotFound,
            Self::ProviderUnavailable { .. }
            | Self::Timeout { .. }
            | Self::CircuitOpen { .. }
            | Self::ResponseParsing { .. }
            | Self::Streaming { .. } => ProviderErrorKind::Unavailable,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimit { .. })
    }

    /// Whether a later identical request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ProviderErrorKind::RateLimited | ProviderErrorKind::Unavailable
        )
    }

    /// Backend-suggested delay in seconds
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Stable code for the outbound `error` message
    pub fn client_code(&self) -> &'static str {
        match self {
            Self::Authentication { .. } => "provider_auth_error",
            Self::RateLimit { .. } => "provider_rate_limited",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::ModelNotFound { .. } => "model_not_found",
            Self::UnsupportedModel { .. } => "unsupported_model",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::Timeout { .. } => "provider_timeout",
            Self::CircuitOpen { .. } => "circuit_open",
            Self::ResponseParsing { .. } | Self::Streaming { .. } => "provider_error",
        }
    }

    /// Client-safe message; backend credential failures are not echoed verbatim
    pub fn client_message(&self) -> String {
        match self {
            Self::Authentication { provider, .. } => {
                format!("Provider {} rejected the gateway credentials", provider)
            }
            Self::ResponseParsing { provider, .. } | Self::Streaming { provider, .. } => {
                format!("Provider {} returned a malformed response", provider)
            }
            other => other.to_string(),
        }
    }

    /// Provider name as reported by the error
    pub fn provider(&self) -> &str {
        match self {
            Self::Authentication { provider, .. }
            | Self::RateLimit { provider, .. }
            | Self::InvalidRequest { provider, .. }
            | Self::ModelNotFound { provider, .. }
            | Self::UnsupportedModel { provider, .. }
            | Self::ProviderUnavailable { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::ResponseParsing { provider, .. }
            | Self::Streaming { provider, .. } => provider,
            Self::CircuitOpen { provider } => provider,
        }
    }
}
