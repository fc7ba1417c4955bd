//! WebSocket endpoint
//!
//! The credential is verified before the upgrade; a rejected client gets a plain 401 and is
//! never registered.

use crate::auth::{extract_credential, select_protocol};
use crate::server::connection::{Connection, WsTransport};
use crate::server::protocol::ServerMessage;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::http::header::{HeaderValue, SEC_WEBSOCKET_PROTOCOL};
use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::{Message, MessageStream};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{Instrument, debug, info_span, warn};

/// `GET /ws`
pub async fn ws_handler(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    let credential = extract_credential(req.headers(), req.query_string()).ok_or_else(|| {
        debug!("WebSocket upgrade without credential");
        GatewayError::auth("Missing bearer credential")
    })?;

    let user = state
        .authenticator
        .authenticate(&credential.token)
        .await
        .map_err(|e| {
            warn!(source = ?credential.source, error = %e, "WebSocket connection rejected");
            e
        })?;

    let (mut response, session, stream) = actix_ws::handle(&req, body)
        .map_err(|e| GatewayError::bad_request(format!("WebSocket handshake failed: {}", e)))?;

    if let Some(protocol) = select_protocol(req.headers()) {
        if let Ok(value) = HeaderValue::from_str(&protocol) {
            response.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, value);
        }
    }

    let stream = stream.max_frame_size(state.config.gateway.server.max_frame_size);
    let connection = state
        .connections
        .create(Arc::new(WsTransport::new(session)), user);

    let span = info_span!(
        "connection",
        connection_id = %connection.id(),
        user_id = %connection.user().id,
    );
    actix_web::rt::spawn(
        connection_loop(state.get_ref().clone(), connection, stream).instrument(span),
    );

    Ok(response)
}

/// Read frames until the client leaves or the manager drops the connection
async fn connection_loop(state: AppState, connection: Arc<Connection>, mut stream: MessageStream) {
    let id = connection.id().to_string();
    if let Err(e) = connection.send(&ServerMessage::connected(&id)).await {
        debug!(error = %e, "Failed to send connected message");
    }

    loop {
        tokio::select! {
            _ = connection.closed() => {
                debug!("Connection removed by manager");
                break;
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        state.connections.mark_alive(&id);
                        let _ = state.sessions.handle_text(&connection, &text).await;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        state.connections.mark_alive(&id);
                        let error = GatewayError::bad_request("Binary frames are not supported");
                        if let Err(e) = connection.send(&ServerMessage::error("", &error)).await {
                            debug!(error = %e, "Failed to reject binary frame");
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        state.connections.mark_alive(&id);
                        if let Err(e) = connection.transport().pong(&payload).await {
                            debug!(error = %e, "Failed to answer ping");
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        state.connections.mark_alive(&id);
                    }
                    Some(Ok(Message::Close(reason))) => {
                        debug!(?reason, "Client closed connection");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket protocol error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    state.connections.remove(&id);
    connection.transport().close(None).await;
}
