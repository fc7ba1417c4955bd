//! Application state shared across handlers

use crate::auth::{CapabilityMatrix, ConnectionAuthenticator, InMemoryRevocationList, JwtVerifier};
use crate::config::Config;
use crate::core::audit::{ChannelUsageSink, TracingUsageSink, UsageSink};
use crate::core::credits::CreditService;
use crate::core::rate_limiter::UsageTracker;
use crate::core::router::ProviderRouter;
use crate::server::connection::ConnectionManager;
use crate::server::session::SessionHandler;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Usage records buffered ahead of the audit writer
const AUDIT_BUFFER: usize = 1024;

/// Every component is constructed once at startup and shared through `Arc`
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub authenticator: Arc<ConnectionAuthenticator>,
    pub capabilities: Arc<CapabilityMatrix>,
    pub connections: Arc<ConnectionManager>,
    pub router: Arc<ProviderRouter>,
    pub credits: Arc<CreditService>,
    pub usage: Arc<UsageTracker>,
    pub sessions: Arc<SessionHandler>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Assemble state from already-built collaborators
    pub fn new(
        config: Config,
        authenticator: ConnectionAuthenticator,
        router: ProviderRouter,
        credits: CreditService,
        audit: Arc<dyn UsageSink>,
    ) -> Result<Self> {
        let capabilities = Arc::new(CapabilityMatrix::from_config(&config.gateway.roles)?);
        let connections = Arc::new(ConnectionManager::new());
        let usage = Arc::new(UsageTracker::new());
        let router = Arc::new(router);
        let credits = Arc::new(credits);

        let sessions = Arc::new(SessionHandler::new(
            Arc::clone(&capabilities),
            Arc::clone(&usage),
            Arc::clone(&credits),
            Arc::clone(&router),
            Arc::clone(&connections),
            audit,
        ));

        Ok(Self {
            config: Arc::new(config),
            authenticator: Arc::new(authenticator),
            capabilities,
            connections,
            router,
            credits,
            usage,
            sessions,
            started_at: Utc::now(),
        })
    }

    /// Build every component from configuration. Must run inside a tokio runtime.
    pub fn from_config(config: Config) -> Result<Self> {
        let gateway = &config.gateway;

        let authenticator = ConnectionAuthenticator::new(
            JwtVerifier::new(&gateway.auth),
            Arc::new(InMemoryRevocationList::new(
                gateway.auth.revoked_token_ids.iter().cloned(),
            )),
        );
        let router = ProviderRouter::from_config(gateway)?;
        let credits = CreditService::from_config(&gateway.credits)?;
        let audit: Arc<dyn UsageSink> =
            Arc::new(ChannelUsageSink::spawn(AUDIT_BUFFER, Arc::new(TracingUsageSink)));

        Self::new(config, authenticator, router, credits, audit)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
