//! Capability matrix: role lookup, per-request authorization and rate-limit evaluation

use super::permissions::{any_matches, permission_matches};
use super::roles::default_capabilities;
use super::types::{AuthorizationDecision, RateLimitDecision, RoleCapability, UsageSnapshot};
use crate::auth::user::AuthenticatedUser;
use crate::config::RolesConfig;
use crate::utils::error::{GatewayError, Result};
use chrono::Duration;
use std::collections::HashMap;
use tracing::{debug, info};

/// Read-only after construction; shared without synchronization
#[derive(Debug, Clone)]
pub struct CapabilityMatrix {
    roles: HashMap<String, RoleCapability>,
    default: RoleCapability,
}

impl CapabilityMatrix {
    /// Build the matrix. `default_role` must name one of `capabilities`.
    pub fn new(capabilities: Vec<RoleCapability>, default_role: &str) -> Result<Self> {
        let roles: HashMap<String, RoleCapability> = capabilities
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect();

        let default = roles.get(default_role).cloned().ok_or_else(|| {
            GatewayError::config(format!("Default role '{}' is not defined", default_role))
        })?;

        info!(roles = roles.len(), default_role, "Capability matrix loaded");
        Ok(Self { roles, default })
    }

    /// Built-in roles unless the configuration supplies its own
    pub fn from_config(config: &RolesConfig) -> Result<Self> {
        let capabilities = if config.capabilities.is_empty() {
            default_capabilities()
        } else {
            config.capabilities.clone()
        };
        Self::new(capabilities, &config.default_role)
    }

    /// Pure lookup; unknown roles get the default (most restrictive) capability
    pub fn resolve_capability(&self, role: &str) -> &RoleCapability {
        match self.roles.get(role) {
            Some(capability) => capability,
            None => {
                debug!(role, fallback = %self.default.name, "Unknown role, using default");
                &self.default
            }
        }
    }

    /// Model, then feature, then token ceiling. The first failing check decides the reason.
    pub fn authorize(
        &self,
        user: &AuthenticatedUser,
        model: &str,
        tokens_requested: u32,
        feature: &str,
    ) -> AuthorizationDecision {
        let capability = self.resolve_capability(&user.role);

        if !any_matches(&capability.allowed_models, model) {
            return AuthorizationDecision::Denied {
                reason: format!(
                    "Role '{}' is not allowed to use model '{}'",
                    capability.name, model
                ),
            };
        }

        if !any_matches(&capability.features, feature) {
            return AuthorizationDecision::Denied {
                reason: format!(
                    "Role '{}' does not have access to feature '{}'",
                    capability.name, feature
                ),
            };
        }

        if tokens_requested > capability.max_tokens_per_request {
            return AuthorizationDecision::Denied {
                reason: format!(
                    "Requested {} tokens exceeds the limit of {} for role '{}'",
                    tokens_requested, capability.max_tokens_per_request, capability.name
                ),
            };
        }

        AuthorizationDecision::Allowed
    }

    /// Compare already-counted usage against the capability's limits. Does not count anything.
    pub fn check_rate_limit(
        &self,
        capability: &RoleCapability,
        usage: &UsageSnapshot,
    ) -> RateLimitDecision {
        self.check_rate_limit_for(capability, usage, 0)
    }

    /// Like [`check_rate_limit`](Self::check_rate_limit), but also rejects a request whose
    /// `tokens_requested` would carry the window past the token limit.
    pub fn check_rate_limit_for(
        &self,
        capability: &RoleCapability,
        usage: &UsageSnapshot,
        tokens_requested: u64,
    ) -> RateLimitDecision {
        let reset_time = usage.window_start + Duration::seconds(60);
        let limits = capability.rate_limit;

        if usage.requests >= limits.requests_per_minute {
            return RateLimitDecision::Limited {
                reason: format!(
                    "Request rate limit exceeded: {} requests per minute",
                    limits.requests_per_minute
                ),
                reset_time,
            };
        }

        if usage.tokens >= limits.tokens_per_minute
            || usage.tokens.saturating_add(tokens_requested) > limits.tokens_per_minute
        {
            return RateLimitDecision::Limited {
                reason: format!(
                    "Token rate limit exceeded: {} tokens per minute",
                    limits.tokens_per_minute
                ),
                reset_time,
            };
        }

        RateLimitDecision::Allowed
    }

    pub fn has_permission(&self, role: &str, permission: &str) -> bool {
        self.resolve_capability(role)
            .permissions
            .iter()
            .any(|granted| permission_matches(granted, permission))
    }

    pub fn roles(&self) -> impl Iterator<Item = &RoleCapability> {
        self.roles.values()
    }
}
