//! Configuration validation
//!
//! - `trait_def`: Core Validate trait definition
//! - `config_validators`: GatewayConfig, ServerConfig, ProviderConfig, CreditConfig
//! - `router_validators`: router and breaker settings
//! - `auth_validators`: token verification and role matrix settings

mod auth_validators;
mod config_validators;
mod router_validators;
mod trait_def;

pub use trait_def::Validate;
