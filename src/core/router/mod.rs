//! Core router for AI provider selection and failover
//!
//! - `router` - breaker-wrapped provider slots, explicit and `auto` selection, status

#[allow(clippy::module_inception)]
pub mod router;

#[cfg(test)]
mod tests;

pub use router::{ProviderRouter, ProviderSlot, ProviderStatus, RoutedResponse};
