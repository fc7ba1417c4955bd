//! HTTP server core implementation

use crate::config::{Config, ServerConfig};
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::{App, HttpServer as ActixHttpServer, middleware::DefaultHeaders, web};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracing_actix_web::TracingLogger;

const SERVER_HEADER: &str = concat!("litellm-ws-gateway/", env!("CARGO_PKG_VERSION"));

/// HTTP server
pub struct HttpServer {
    config: ServerConfig,
    state: AppState,
}

impl HttpServer {
    /// Build all components from configuration. Must run inside a tokio runtime.
    pub fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");
        let state = AppState::from_config(config.clone())?;
        Ok(Self::with_state(state))
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            config: state.config.gateway.server.clone(),
            state,
        }
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(TracingLogger::default())
            .wrap(DefaultHeaders::new().add(("Server", SERVER_HEADER)))
            .configure(routes::configure_routes)
    }

    /// Serve until the process is asked to stop, then close every connection
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        let heartbeat = spawn_heartbeat(self.state.clone(), self.config.heartbeat_interval());

        let data = web::Data::new(self.state.clone());
        let mut server = ActixHttpServer::new(move || Self::create_app(data.clone()));
        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind(&bind_addr)
            .map_err(|e| GatewayError::config(format!("Failed to bind {}: {}", bind_addr, e)))?
            .run();

        info!("HTTP server listening on {}", bind_addr);
        let result = server.await;

        heartbeat.abort();
        self.state.connections.shutdown().await;
        info!("HTTP server stopped");

        result.map_err(|e| GatewayError::internal(format!("Server error: {}", e)))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Periodic liveness sweep, independent of any single connection
pub fn spawn_heartbeat(state: AppState, period: Duration) -> JoinHandle<()> {
    let period = period.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let report = state.connections.heartbeat().await;
            let purged = state.usage.purge_expired();
            if report.swept > 0 {
                warn!(swept = report.swept, "Reclaimed unresponsive connections");
            }
            debug!(
                probed = report.probed,
                purged_usage_windows = purged,
                "Heartbeat"
            );
        }
    })
}
