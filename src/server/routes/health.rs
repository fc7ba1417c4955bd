//! Health check and status endpoints

use super::{ApiResponse, authenticate_request};
use crate::core::router::ProviderStatus;
use crate::server::state::AppState;
use crate::utils::error::{CircuitState, GatewayError};
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Permission required to read `/status`
pub const STATUS_PERMISSION: &str = "gateway:status";

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    /// `degraded` when any breaker is not closed or nothing is registered
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: i64,
    pub connections: usize,
    pub users: usize,
    pub providers: Vec<ProviderStatus>,
    pub pending_settlements: usize,
    pub timestamp: DateTime<Utc>,
}

/// `GET /health`
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    }))
}

/// `GET /status`
pub async fn system_status(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    let user = authenticate_request(&req, &state).await?;
    if !state.capabilities.has_permission(&user.role, STATUS_PERMISSION) {
        return Err(GatewayError::authorization(format!(
            "Role '{}' may not read gateway status",
            user.role
        )));
    }
    debug!(user_id = %user.id, "Status requested");

    let providers = state.router.get_status();
    let degraded =
        providers.is_empty() || providers.iter().any(|p| p.state != CircuitState::Closed);

    Ok(HttpResponse::Ok().json(ApiResponse::success(SystemStatus {
        status: if degraded { "degraded" } else { "healthy" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        connections: state.connections.len(),
        users: state.connections.user_count(),
        providers,
        pending_settlements: state.credits.dead_letters().len(),
        timestamp: Utc::now(),
    })))
}
