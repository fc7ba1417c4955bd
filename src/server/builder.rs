//! Server builder and `run_server`

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::{GatewayError, Result};
use tracing::info;

/// Server builder for easier configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Config>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| GatewayError::config("Configuration is required"))?;
        HttpServer::new(&config)
    }
}

/// Build the server from `config` and serve until shutdown
pub async fn run_server(config: Config) -> Result<()> {
    let server = ServerBuilder::new().with_config(config).build()?;

    let server_config = server.config();
    info!(
        "Gateway starting at ws://{}:{}/ws",
        server_config.host, server_config.port
    );
    info!("   GET /ws     - WebSocket gateway");
    info!("   GET /health - Liveness");
    info!("   GET /status - Provider and connection status");

    server.start().await
}
