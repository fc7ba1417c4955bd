//! RBAC type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static capability set of one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCapability {
    /// Role name as carried in the token
    pub name: String,
    /// `category:action` permissions; `category:*` and `*` are wildcards
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Model identifiers; `*` allows every model, a trailing `*` matches a prefix
    #[serde(default)]
    pub allowed_models: Vec<String>,
    /// Request features (`chat`, `completion`); `*` allows all
    #[serde(default)]
    pub features: Vec<String>,
    /// Largest token count a single request may ask for
    pub max_tokens_per_request: u32,
    pub rate_limit: RateLimitSpec,
}

/// Per-minute allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSpec {
    pub requests_per_minute: u32,
    pub tokens_per_minute: u64,
}

/// Usage already counted in the current one-minute window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub requests: u32,
    pub tokens: u64,
    pub window_start: DateTime<Utc>,
}

impl UsageSnapshot {
    pub fn empty(window_start: DateTime<Utc>) -> Self {
        Self {
            requests: 0,
            tokens: 0,
            window_start,
        }
    }
}

/// Outcome of `authorize`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    Allowed,
    Denied { reason: String },
}

impl AuthorizationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Outcome of `check_rate_limit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited {
        reason: String,
        reset_time: DateTime<Utc>,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}
