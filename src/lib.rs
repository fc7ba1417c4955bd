//! # litellm-ws-gateway
//!
//! Multi-tenant WebSocket gateway in front of several LLM providers.
//!
//! - Connections authenticate once with a bearer JWT and are tracked by a
//!   [`ConnectionManager`](server::ConnectionManager) with heartbeat-based liveness.
//! - Each request is checked against the role capability matrix, rate limited, and priced
//!   against the caller's credit balance before any provider is contacted.
//! - Providers (OpenAI, Anthropic, Gemini) sit behind per-provider circuit breakers; `auto`
//!   requests fail over from the primary to the fallback.
//! - Streaming and non-streaming responses share one wire protocol that always ends with
//!   exactly one terminal message.
//!
//! ```rust,no_run
//! use litellm_ws_gateway::{Config, server};
//!
//! #[actix_web::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml").await?;
//!     server::run_server(config).await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod core;
pub mod server;
pub mod utils;

pub use config::Config;
pub use core::providers::{LLMProvider, ProviderError, ProviderType};
pub use core::router::ProviderRouter;
pub use core::types::{GatewayRequest, ProviderResponse, ResponseChunk, Usage};
pub use server::{ConnectionManager, HttpServer, ServerMessage, SessionHandler};
pub use utils::error::{GatewayError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Gateway build information
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    /// Unix timestamp of the build
    pub build_time: &'static str,
    pub git_hash: &'static str,
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
            rust_version: option_env!("RUST_VERSION").unwrap_or("unknown"),
        }
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
