//! Router configuration

use crate::utils::error::CircuitBreakerConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Primary/fallback selection for `auto` requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Provider tried first for `auto` requests
    pub primary: Option<String>,
    /// Provider tried when the primary fails
    pub fallback: Option<String>,
    /// Breaker settings shared by every provider
    #[serde(default)]
    pub circuit_breaker: BreakerSettings,
}

/// Circuit breaker settings as written in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerSettings {
    #[serde(default = "default_failure_rate_threshold")]
    pub failure_rate_threshold: f64,
    #[serde(default = "default_minimum_volume")]
    pub minimum_volume: u32,
    #[serde(default = "default_reset_timeout")]
    pub reset_timeout_secs: u64,
    #[serde(default = "default_rolling_window")]
    pub rolling_window_secs: u64,
}

fn default_failure_rate_threshold() -> f64 {
    0.5
}

fn default_minimum_volume() -> u32 {
    5
}

fn default_reset_timeout() -> u64 {
    30
}

fn default_rolling_window() -> u64 {
    60
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_rate_threshold: default_failure_rate_threshold(),
            minimum_volume: default_minimum_volume(),
            reset_timeout_secs: default_reset_timeout(),
            rolling_window_secs: default_rolling_window(),
        }
    }
}

impl From<&BreakerSettings> for CircuitBreakerConfig {
    fn from(settings: &BreakerSettings) -> Self {
        CircuitBreakerConfig {
            failure_rate_threshold: settings.failure_rate_threshold,
            minimum_volume: settings.minimum_volume.max(1),
            reset_timeout: Duration::from_secs(settings.reset_timeout_secs),
            rolling_window: Duration::from_secs(settings.rolling_window_secs),
        }
    }
}
