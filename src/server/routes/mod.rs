//! HTTP route modules
//!
//! - `ws` - WebSocket upgrade and the per-connection read loop
//! - `health` - liveness and provider status

pub mod health;
pub mod ws;

use crate::auth::{AuthenticatedUser, extract_credential};
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::{HttpRequest, web};
use tracing::debug;

/// Standard JSON envelope for the HTTP endpoints
#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: serde::Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Register every route
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(ws::ws_handler))
        .route("/health", web::get().to(health::health_check))
        .route("/status", web::get().to(health::system_status));
}

/// Verify the bearer credential carried by an HTTP request
pub(crate) async fn authenticate_request(
    req: &HttpRequest,
    state: &AppState,
) -> Result<AuthenticatedUser> {
    let credential = extract_credential(req.headers(), req.query_string()).ok_or_else(|| {
        debug!(path = %req.path(), "Request without credential");
        GatewayError::auth("Missing bearer credential")
    })?;
    state.authenticator.authenticate(&credential.token).await
}
