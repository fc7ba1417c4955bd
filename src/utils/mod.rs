//! Utility modules for the gateway
//!
//! - **error**: gateway error type, circuit breaker and retry/fallback policies
//! - **logging**: tracing subscriber setup

pub mod error;
pub mod logging;

use uuid::Uuid;

/// Generate a unique connection or request ID
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
