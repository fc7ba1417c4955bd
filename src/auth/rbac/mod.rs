//! Role capability matrix
//!
//! Static role → capability mapping plus the authorization and rate-limit checks built on it.

pub mod permissions;
pub mod roles;
mod system;
pub mod types;

pub use system::CapabilityMatrix;
pub use types::{
    AuthorizationDecision, RateLimitDecision, RateLimitSpec, RoleCapability, UsageSnapshot,
};
