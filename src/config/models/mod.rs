//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

#![allow(missing_docs)]

pub mod auth;
pub mod credit;
pub mod gateway;
pub mod logging;
pub mod provider;
pub mod router;
pub mod server;

// Re-export all configuration types
pub use auth::*;
pub use credit::*;
pub use gateway::*;
pub use logging::*;
pub use provider::*;
pub use router::*;
pub use server::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default provider request timeout in seconds
pub fn default_timeout() -> u64 {
    60
}

/// Default maximum retry attempts, first call included
pub fn default_max_retries() -> u32 {
    3
}

pub fn default_true() -> bool {
    true
}

/// Resolve a `${ENV_VAR}` placeholder. Plain values pass through unchanged.
pub fn resolve_env_placeholder(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    match trimmed
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(var) if !var.is_empty() => std::env::var(var)
            .map_err(|_| format!("Environment variable '{}' is not set", var)),
        Some(_) => Err("Empty environment placeholder".to_string()),
        None => Ok(value.to_string()),
    }
}
