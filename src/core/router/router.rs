//! Provider router
//!
//! Every registered adapter sits behind its own circuit breaker. Explicit requests go to the
//! named provider only; `auto` requests try the primary, then the fallback.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::core::providers::{LLMProvider, ProviderError, build_provider};
use crate::core::types::{
    ChunkStream, FinishReason, GatewayRequest, ProviderResponse, ProviderSelection, ResponseChunk,
};
use crate::utils::error::{
    BreakerPermit, CircuitBreaker, CircuitBreakerConfig, CircuitState, FallbackOnFailure,
    GatewayError, ProviderAttempt, Result, run_with_recovery,
};

/// One registered adapter and its breaker
#[derive(Debug)]
pub struct ProviderSlot {
    name: String,
    provider: Arc<dyn LLMProvider>,
    breaker: Arc<CircuitBreaker>,
}

impl ProviderSlot {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// One call through the breaker. A streamed response keeps its permit until the stream
    /// ends, so mid-stream failures and incomplete streams count against the provider.
    async fn call(&self, request: &GatewayRequest) -> std::result::Result<ProviderResponse, ProviderError> {
        let permit = self.breaker.acquire()?;
        match self.provider.execute(request).await {
            Ok(ProviderResponse::Complete(response)) => {
                permit.record(true);
                Ok(ProviderResponse::Complete(response))
            }
            Ok(ProviderResponse::Stream(stream)) => {
                Ok(ProviderResponse::Stream(track_stream(stream, permit)))
            }
            Err(error) => {
                permit.record(false);
                Err(error)
            }
        }
    }
}

/// Forward `stream` unchanged and settle `permit` on its terminal item: `Done` with a real
/// finish reason is a success; an error or an `incomplete` finish is a failure. A stream
/// dropped before its end records nothing.
fn track_stream(stream: ChunkStream, permit: BreakerPermit) -> ChunkStream {
    Box::pin(async_stream::stream! {
        let mut stream = stream;
        let mut permit = Some(permit);
        while let Some(item) = stream.next().await {
            let outcome = match &item {
                Ok(ResponseChunk::Content(_)) => None,
                Ok(ResponseChunk::Done(summary)) => {
                    Some(summary.finish_reason != FinishReason::Incomplete)
                }
                Err(_) => Some(false),
            };
            if let Some(success) = outcome {
                if let Some(permit) = permit.take() {
                    permit.record(success);
                }
            }
            yield item;
        }
    })
}

/// Successful routing outcome
#[derive(Debug)]
pub struct RoutedResponse {
    /// Router-level name of the provider that answered
    pub provider: String,
    pub response: ProviderResponse,
}

/// Health view of one provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub provider_type: &'static str,
    pub state: CircuitState,
    pub failure_count: u32,
    pub request_count: u32,
    pub last_transition: DateTime<Utc>,
    pub primary: bool,
    pub fallback: bool,
}

/// Routes requests across registered providers
#[derive(Debug)]
pub struct ProviderRouter {
    slots: HashMap<String, Arc<ProviderSlot>>,
    /// Registration order, for stable status output
    order: Vec<String>,
    primary: Option<String>,
    fallback: Option<String>,
}

impl ProviderRouter {
    /// Empty router; the first registered provider becomes primary unless one is set
    pub fn new(primary: Option<String>, fallback: Option<String>) -> Self {
        Self {
            slots: HashMap::new(),
            order: Vec::new(),
            primary,
            fallback,
        }
    }

    /// Build every configured provider and wrap each in a breaker
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let mut router = Self::new(config.router.primary.clone(), config.router.fallback.clone());
        let breaker_config = CircuitBreakerConfig::from(&config.router.circuit_breaker);

        for provider_config in &config.providers {
            let provider = build_provider(provider_config)?;
            router.register(provider_config.name.clone(), provider, breaker_config.clone())?;
        }

        router.check_selection()?;
        info!(
            providers = router.order.len(),
            primary = ?router.primary_name(),
            fallback = ?router.fallback_name(),
            "Provider router initialized"
        );
        Ok(router)
    }

    /// Register an adapter under `name`
    pub fn register(
        &mut self,
        name: impl Into<String>,
        provider: Arc<dyn LLMProvider>,
        breaker_config: CircuitBreakerConfig,
    ) -> Result<()> {
        let name = name.into();
        if self.slots.contains_key(&name) {
            return Err(GatewayError::config(format!(
                "Provider '{}' is registered twice",
                name
            )));
        }

        let slot = ProviderSlot {
            breaker: Arc::new(CircuitBreaker::new(name.clone(), breaker_config)),
            name: name.clone(),
            provider,
        };
        self.slots.insert(name.clone(), Arc::new(slot));
        self.order.push(name);
        Ok(())
    }

    /// Primary and fallback must name registered providers
    pub fn check_selection(&self) -> Result<()> {
        for (role, name) in [("primary", &self.primary), ("fallback", &self.fallback)] {
            if let Some(name) = name {
                if !self.slots.contains_key(name) {
                    return Err(GatewayError::config(format!(
                        "Router {} '{}' is not a registered provider",
                        role, name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn primary_name(&self) -> Option<&str> {
        self.primary.as_deref().or_else(|| self.order.first().map(String::as_str))
    }

    pub fn fallback_name(&self) -> Option<&str> {
        self.fallback
            .as_deref()
            .filter(|fallback| Some(*fallback) != self.primary_name())
    }

    pub fn slot(&self, name: &str) -> Option<&Arc<ProviderSlot>> {
        self.slots.get(name)
    }

    pub fn provider_names(&self) -> &[String] {
        &self.order
    }

    /// Route one request.
    ///
    /// Named providers get a single attempt through their breaker. `auto` tries the primary
    /// and then the fallback with the identical request; when both fail the caller gets
    /// [`GatewayError::AllProvidersUnavailable`] listing each attempt.
    pub async fn handle_request(&self, request: &GatewayRequest) -> Result<RoutedResponse> {
        match &request.provider {
            ProviderSelection::Named(name) => {
                let slot = self
                    .slots
                    .get(name)
                    .ok_or_else(|| GatewayError::ProviderNotFound(name.clone()))?;
                let response = slot.call(request).await.map_err(|e| {
                    warn!(provider = %name, request_id = %request.id, error = %e, "Provider call failed");
                    GatewayError::Provider(e)
                })?;
                Ok(RoutedResponse {
                    provider: slot.name.clone(),
                    response,
                })
            }
            ProviderSelection::Auto => self.handle_auto(request).await,
        }
    }

    async fn handle_auto(&self, request: &GatewayRequest) -> Result<RoutedResponse> {
        let candidates: Vec<Arc<ProviderSlot>> = self
            .primary_name()
            .into_iter()
            .chain(self.fallback_name())
            .filter_map(|name| self.slots.get(name).cloned())
            .collect();

        if candidates.is_empty() {
            return Err(GatewayError::AllProvidersUnavailable {
                attempts: Vec::new(),
            });
        }

        let outcome = run_with_recovery(&FallbackOnFailure, candidates.len(), |index| {
            let slot = Arc::clone(&candidates[index]);
            async move {
                match slot.call(request).await {
                    Ok(response) => Ok(RoutedResponse {
                        provider: slot.name.clone(),
                        response,
                    }),
                    Err(error) => {
                        warn!(
                            provider = %slot.name,
                            request_id = %request.id,
                            error = %error,
                            "Provider failed for auto request"
                        );
                        Err(error)
                    }
                }
            }
        })
        .await;

        outcome.map_err(|exhausted| GatewayError::AllProvidersUnavailable {
            attempts: exhausted
                .failures
                .into_iter()
                .map(|(index, error)| ProviderAttempt {
                    provider: candidates[index].name.clone(),
                    error,
                })
                .collect(),
        })
    }

    /// Breaker state of every provider, in registration order
    pub fn get_status(&self) -> Vec<ProviderStatus> {
        let primary = self.primary_name();
        let fallback = self.fallback_name();
        self.order
            .iter()
            .filter_map(|name| self.slots.get(name))
            .map(|slot| {
                let metrics = slot.breaker.metrics();
                ProviderStatus {
                    name: slot.name.clone(),
                    provider_type: slot.provider.name(),
                    state: metrics.state,
                    failure_count: metrics.failure_count,
                    request_count: metrics.request_count,
                    last_transition: metrics.last_transition,
                    primary: primary == Some(slot.name.as_str()),
                    fallback: fallback == Some(slot.name.as_str()),
                }
            })
            .collect()
    }
}
