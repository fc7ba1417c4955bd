//! Router configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

impl Validate for RouterConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating router configuration");

        if self.primary.is_some() && self.primary == self.fallback {
            return Err("Router primary and fallback must be different providers".to_string());
        }

        self.circuit_breaker.validate()
    }
}

impl Validate for BreakerSettings {
    fn validate(&self) -> Result<(), String> {
        if !(self.failure_rate_threshold > 0.0 && self.failure_rate_threshold <= 1.0) {
            return Err(format!(
                "Circuit breaker failure rate threshold must be in (0, 1], got {}",
                self.failure_rate_threshold
            ));
        }

        if self.minimum_volume == 0 {
            return Err("Circuit breaker minimum volume must be greater than 0".to_string());
        }

        if self.reset_timeout_secs == 0 {
            return Err("Circuit breaker reset timeout must be greater than 0".to_string());
        }

        if self.rolling_window_secs == 0 {
            return Err("Circuit breaker rolling window must be greater than 0".to_string());
        }

        Ok(())
    }
}
