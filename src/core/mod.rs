//! Core functionality for the gateway
//!
//! Provider adapters, routing, credit accounting and the shared request/response types.

pub mod audit;
pub mod credits;
pub mod providers;
pub mod rate_limiter;
pub mod router;
pub mod streaming;
pub mod traits;
pub mod types;
