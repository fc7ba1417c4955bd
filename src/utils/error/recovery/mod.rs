//! Error recovery and resilience utilities
//!
//! Circuit breaker plus the retry/fallback policies the adapters and the router share.

mod circuit_breaker;
mod retry;
mod types;

pub use circuit_breaker::{BreakerPermit, CircuitBreaker};
pub use retry::{
    Exhausted, FallbackOnFailure, RecoveryAction, RecoveryPolicy, RetryOnRateLimit,
    run_with_recovery,
};
pub use types::{CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState, RetryConfig};
