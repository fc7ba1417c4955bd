//! Error Handling utilities
//!
//! Gateway error type plus the recovery primitives (circuit breaker, retry/fallback policies).

pub mod error;
pub mod recovery;

pub use error::*;
pub use recovery::*;
