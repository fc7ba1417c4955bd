//! Authentication and role configuration

use crate::auth::rbac::types::RoleCapability;
use serde::{Deserialize, Serialize};

/// Token verification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret shared with the token issuer; `${ENV_VAR}` allowed
    pub jwt_secret: String,
    /// Expected `iss` claim, if the issuer sets one
    #[serde(default)]
    pub issuer: Option<String>,
    /// Expected `aud` claim, if the issuer sets one
    #[serde(default)]
    pub audience: Option<String>,
    /// Clock skew tolerated on `exp`, in seconds
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
    /// Token ids (`jti`) rejected at connect time
    #[serde(default)]
    pub revoked_token_ids: Vec<String>,
}

fn default_leeway() -> u64 {
    30
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: None,
            audience: None,
            leeway_secs: default_leeway(),
            revoked_token_ids: Vec::new(),
        }
    }
}

/// Capability matrix override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolesConfig {
    /// Role applied when a token names an unknown role
    #[serde(default = "default_role")]
    pub default_role: String,
    /// Replaces the built-in matrix when non-empty
    #[serde(default)]
    pub capabilities: Vec<RoleCapability>,
}

fn default_role() -> String {
    "trial".to_string()
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            default_role: default_role(),
            capabilities: Vec::new(),
        }
    }
}
