//! Types and configurations for error recovery patterns

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Circuit is closed, requests flow normally
    Closed,
    /// Circuit is open, requests are rejected
    Open,
    /// Circuit is half-open, one trial request is let through
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        };
        f.write_str(s)
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Failure rate (0, 1] that must be exceeded to open the circuit
    pub failure_rate_threshold: f64,
    /// Minimum calls observed in the window before the rate is considered
    pub minimum_volume: u32,
    /// Time spent open before a trial call is allowed
    pub reset_timeout: Duration,
    /// Outcomes older than this are forgotten
    pub rolling_window: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 0.5,
            minimum_volume: 5,
            reset_timeout: Duration::from_secs(30),
            rolling_window: Duration::from_secs(60),
        }
    }
}

/// Point-in-time view of a breaker, used for health reporting
#[derive(Debug, Clone, Serialize)]
pub struct CircuitBreakerMetrics {
    /// Current circuit breaker state
    pub state: CircuitState,
    /// Failures inside the rolling window
    pub failure_count: u32,
    /// Calls inside the rolling window
    pub request_count: u32,
    /// When the state last changed
    pub last_transition: DateTime<Utc>,
}

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first call included
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Exponential delay before attempt `attempt + 1`, given `attempt` failures so far
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.base_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);

        let with_jitter = if self.jitter {
            let jitter_factor = 0.1;
            capped + capped * jitter_factor * (rand::random::<f64>() - 0.5)
        } else {
            capped
        };

        Duration::from_millis(with_jitter.max(0.0) as u64)
    }
}
