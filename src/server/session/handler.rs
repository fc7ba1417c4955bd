//! Per-request orchestration
//!
//! validate → authorize → credit check → rate limit → route → deliver → settle → audit.
//! Everything before routing is resolved here and never reaches a provider.

use crate::auth::{
    AuthenticatedUser, AuthorizationDecision, CapabilityMatrix, RateLimitDecision,
};
use crate::core::audit::{UsageRecord, UsageSink};
use crate::core::credits::{CreditEstimation, CreditService};
use crate::core::rate_limiter::UsageTracker;
use crate::core::router::ProviderRouter;
use crate::core::types::{
    ChunkStream, FinishReason, GatewayRequest, ProviderResponse, ResponseChunk, StreamSummary,
    Usage,
};
use crate::server::connection::{Connection, ConnectionManager};
use crate::server::protocol::{ClientMessage, ServerMessage};
use crate::utils::error::{GatewayError, Result};
use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

/// What happened to one request, for settlement and audit
#[derive(Debug)]
struct RequestOutcome {
    provider: Option<String>,
    model: String,
    usage: Option<Usage>,
    estimation: Option<CreditEstimation>,
    error: Option<GatewayError>,
}

impl RequestOutcome {
    fn new(model: &str) -> Self {
        Self {
            provider: None,
            model: model.to_string(),
            usage: None,
            estimation: None,
            error: None,
        }
    }

    /// Reported usage when there is any. A delivered response without usage is charged at
    /// the pre-flight estimate; a failed one without usage is not charged.
    fn billable_tokens(&self) -> u32 {
        match (self.usage, &self.provider, &self.error) {
            (Some(usage), _, _) => usage.total_tokens,
            (None, Some(_), None) => self.estimation.map(|e| e.total_tokens()).unwrap_or(0),
            _ => 0,
        }
    }
}

pub struct SessionHandler {
    capabilities: Arc<CapabilityMatrix>,
    usage: Arc<UsageTracker>,
    credits: Arc<CreditService>,
    router: Arc<ProviderRouter>,
    connections: Arc<ConnectionManager>,
    audit: Arc<dyn UsageSink>,
}

impl std::fmt::Debug for SessionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandler")
            .field("providers", &self.router.provider_names())
            .field("connections", &self.connections.len())
            .finish()
    }
}

impl SessionHandler {
    pub fn new(
        capabilities: Arc<CapabilityMatrix>,
        usage: Arc<UsageTracker>,
        credits: Arc<CreditService>,
        router: Arc<ProviderRouter>,
        connections: Arc<ConnectionManager>,
        audit: Arc<dyn UsageSink>,
    ) -> Self {
        Self {
            capabilities,
            usage,
            credits,
            router,
            connections,
            audit,
        }
    }

    /// Handle one inbound text frame. Requests are spawned; control messages are answered
    /// inline.
    pub async fn handle_text(
        self: &Arc<Self>,
        connection: &Arc<Connection>,
        text: &str,
    ) -> Option<JoinHandle<()>> {
        match ClientMessage::parse(text) {
            Ok(ClientMessage::Ping { id }) => {
                self.reply(connection, ServerMessage::pong(&id)).await;
                None
            }
            Ok(ClientMessage::Cancel { id }) => {
                self.cancel(connection, &id).await;
                None
            }
            Ok(ClientMessage::Request(request)) => self.dispatch(connection, *request).await,
            Err(malformed) => {
                debug!(
                    connection_id = %connection.id(),
                    error = %malformed.error,
                    "Rejected malformed message"
                );
                self.reply(connection, ServerMessage::error(&malformed.id, &malformed.error))
                    .await;
                None
            }
        }
    }

    /// Register the request as pending and run it on its own task
    pub async fn dispatch(
        self: &Arc<Self>,
        connection: &Arc<Connection>,
        request: GatewayRequest,
    ) -> Option<JoinHandle<()>> {
        let request = Arc::new(request);
        if let Err(e) = connection.add_pending(Arc::clone(&request)) {
            self.reply(connection, ServerMessage::error(&request.id, &e))
                .await;
            return None;
        }

        let span = info_span!(
            "request",
            connection_id = %connection.id(),
            user_id = %connection.user().id,
            request_id = %request.id,
            model = %request.model,
        );

        let handler = Arc::clone(self);
        let task_connection = Arc::clone(connection);
        let task_request = Arc::clone(&request);
        let task = tokio::spawn(
            async move { handler.process(&task_connection, task_request).await }.instrument(span),
        );
        connection.attach_abort(&request.id, task.abort_handle());
        Some(task)
    }

    /// Run the full pipeline for one request and report it
    pub async fn process(&self, connection: &Connection, request: Arc<GatewayRequest>) {
        let started = Instant::now();
        let outcome = self.run(connection, &request).await;

        let user = connection.user();
        let tokens = outcome.billable_tokens();
        let credits = if tokens > 0 {
            self.credits
                .settle(&user.id, &request.id, tokens, &outcome.model)
                .await
                .credits()
        } else {
            0.0
        };

        match &outcome.error {
            None => info!(
                provider = outcome.provider.as_deref().unwrap_or("-"),
                tokens,
                credits,
                "Request completed"
            ),
            Some(e) => info!(code = e.client_code(), error = %e, "Request failed"),
        }

        self.audit.record(UsageRecord {
            user_id: user.id.clone(),
            connection_id: connection.id().to_string(),
            request_id: request.id.clone(),
            provider: outcome.provider,
            model: outcome.model,
            usage: outcome.usage,
            credits,
            duration_ms: started.elapsed().as_millis() as u64,
            success: outcome.error.is_none(),
            error: outcome.error.as_ref().map(|e| e.client_code().to_string()),
            timestamp: Utc::now(),
        });
    }

    async fn run(&self, connection: &Connection, request: &GatewayRequest) -> RequestOutcome {
        let mut outcome = RequestOutcome::new(&request.model);

        match self.preflight(connection.user(), request).await {
            Ok(estimation) => outcome.estimation = Some(estimation),
            Err(e) => {
                self.terminal(connection, &request.id, ServerMessage::error(&request.id, &e))
                    .await;
                outcome.error = Some(e);
                return outcome;
            }
        }

        let routed = match self.router.handle_request(request).await {
            Ok(routed) => routed,
            Err(e) => {
                warn!(error = %e, "Routing failed");
                self.terminal(connection, &request.id, ServerMessage::error(&request.id, &e))
                    .await;
                outcome.error = Some(e);
                return outcome;
            }
        };

        outcome.provider = Some(routed.provider.clone());
        match routed.response {
            ProviderResponse::Complete(response) => {
                outcome.model = response.model.clone();
                outcome.usage = response.usage;
                let message = ServerMessage::response(&request.id, &routed.provider, response);
                self.terminal(connection, &request.id, message).await;
            }
            ProviderResponse::Stream(stream) => {
                self.deliver_stream(connection, request, &routed.provider, stream, &mut outcome)
                    .await;
            }
        }
        outcome
    }

    /// Authorization, the credit pre-check and rate limiting. The rate-limit window only
    /// counts requests that passed every other check.
    async fn preflight(
        &self,
        user: &AuthenticatedUser,
        request: &GatewayRequest,
    ) -> Result<CreditEstimation> {
        request.validate()?;

        let capability = self.capabilities.resolve_capability(&user.role);
        let estimation = self.credits.estimate(request);
        let tokens_requested = request
            .params
            .max_tokens
            .unwrap_or_else(|| estimation.total_tokens());

        if let AuthorizationDecision::Denied { reason } = self.capabilities.authorize(
            user,
            &request.model,
            tokens_requested,
            request.request_type.feature(),
        ) {
            debug!(%reason, "Authorization denied");
            return Err(GatewayError::Authorization(reason));
        }

        let estimation = self.credits.check_sufficient_credits(&user.id, request).await?;

        let tokens = u64::from(estimation.total_tokens());
        let decision = self.usage.admit(&user.id, tokens, |usage| {
            self.capabilities
                .check_rate_limit_for(capability, usage, tokens)
        });
        if let RateLimitDecision::Limited { reason, reset_time } = decision {
            debug!(%reason, %reset_time, "Rate limited");
            return Err(GatewayError::RateLimited { reason, reset_time });
        }

        Ok(estimation)
    }

    async fn deliver_stream(
        &self,
        connection: &Connection,
        request: &GatewayRequest,
        provider: &str,
        mut stream: ChunkStream,
        outcome: &mut RequestOutcome,
    ) {
        while let Some(item) = stream.next().await {
            match item {
                Ok(ResponseChunk::Content(content)) => {
                    if !connection.is_pending(&request.id) {
                        debug!("Request no longer pending, dropping stream");
                        return;
                    }
                    if let Err(e) = connection
                        .send(&ServerMessage::chunk(&request.id, content))
                        .await
                    {
                        debug!(error = %e, "Client stopped accepting chunks");
                        connection.take_pending(&request.id);
                        outcome.error = Some(e);
                        return;
                    }
                }
                Ok(ResponseChunk::Done(summary)) => {
                    outcome.model = summary.model.clone();
                    outcome.usage = summary.usage;
                    self.terminal(
                        connection,
                        &request.id,
                        ServerMessage::done(&request.id, provider, summary),
                    )
                    .await;
                    return;
                }
                Err(e) => {
                    let error = GatewayError::Provider(e);
                    warn!(provider, error = %error, "Stream failed");
                    self.terminal(
                        connection,
                        &request.id,
                        ServerMessage::error(&request.id, &error),
                    )
                    .await;
                    outcome.error = Some(error);
                    return;
                }
            }
        }

        // Adapters always end with Done or an error; close the exchange anyway if one did not
        let summary = StreamSummary {
            model: outcome.model.clone(),
            finish_reason: FinishReason::Incomplete,
            usage: None,
        };
        self.terminal(
            connection,
            &request.id,
            ServerMessage::done(&request.id, provider, summary),
        )
        .await;
    }

    /// Send a request's terminal message, unless something else already claimed it
    async fn terminal(&self, connection: &Connection, request_id: &str, message: ServerMessage) {
        if connection.take_pending(request_id).is_none() {
            debug!(request_id, "Terminal message suppressed, request already closed");
            return;
        }
        if let Err(e) = connection.send(&message).await {
            debug!(request_id, error = %e, "Failed to deliver terminal message");
        }
    }

    async fn cancel(&self, connection: &Connection, request_id: &str) {
        match connection.cancel_pending(request_id) {
            Some(request) => {
                info!(connection_id = %connection.id(), request_id, "Request cancelled by client");
                let error = GatewayError::cancelled("Request cancelled by client");
                self.reply(connection, ServerMessage::error(request_id, &error))
                    .await;
                self.audit.record(UsageRecord {
                    user_id: connection.user().id.clone(),
                    connection_id: connection.id().to_string(),
                    request_id: request.id.clone(),
                    provider: None,
                    model: request.model.clone(),
                    usage: None,
                    credits: 0.0,
                    duration_ms: 0,
                    success: false,
                    error: Some(error.client_code().to_string()),
                    timestamp: Utc::now(),
                });
            }
            None => {
                let error = GatewayError::not_found(format!(
                    "No in-flight request with id '{}'",
                    request_id
                ));
                self.reply(connection, ServerMessage::error(request_id, &error))
                    .await;
            }
        }
    }

    async fn reply(&self, connection: &Connection, message: ServerMessage) {
        if let Err(e) = connection.send(&message).await {
            debug!(connection_id = %connection.id(), error = %e, "Failed to send reply");
        }
    }
}
