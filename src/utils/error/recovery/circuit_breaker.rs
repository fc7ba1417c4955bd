//! Circuit breaker implementation for fault tolerance
//!
//! Failure-rate breaker over a rolling time window. All transitions happen under one lock so
//! concurrent callers cannot interleave two transitions.

use super::types::{CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState};
use crate::core::providers::unified_provider::ProviderError;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    /// (completed at, succeeded)
    outcomes: VecDeque<(Instant, bool)>,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
    last_transition: DateTime<Utc>,
}

/// Circuit breaker guarding one provider
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

/// Admission ticket for one call. A trial permit dropped without an outcome frees the
/// half-open slot so the breaker cannot stay wedged after a cancelled trial.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    recorded: bool,
}

impl Permit<'_> {
    fn record(mut self, success: bool) {
        self.recorded = true;
        self.breaker.on_outcome(self.trial, success);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.recorded {
            self.breaker.abandon(self.trial);
        }
    }
}

/// Owned admission ticket, for calls whose outcome is only known after the call returns
/// (a response stream that can still fail). Same drop rules as a borrowed permit.
#[derive(Debug)]
pub struct BreakerPermit {
    breaker: Arc<CircuitBreaker>,
    trial: bool,
    recorded: bool,
}

impl BreakerPermit {
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn record(mut self, success: bool) {
        self.recorded = true;
        self.breaker.on_outcome(self.trial, success);
    }
}

impl Drop for BreakerPermit {
    fn drop(&mut self) {
        if !self.recorded {
            self.breaker.abandon(self.trial);
        }
    }
}

impl CircuitBreaker {
    /// Create a new circuit breaker
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                outcomes: VecDeque::new(),
                opened_at: None,
                trial_in_flight: false,
                last_transition: Utc::now(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` under breaker protection. When the circuit is open `f` is never invoked.
    pub async fn call<T, F, Fut>(&self, f: F) -> Result<T, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let permit = Permit {
            breaker: self,
            trial: self.admit()?,
            recorded: false,
        };

        match f().await {
            Ok(value) => {
                permit.record(true);
                Ok(value)
            }
            Err(error) => {
                permit.record(false);
                Err(error)
            }
        }
    }

    /// Admit one call and hand back an owned permit. The caller must `record` the outcome;
    /// dropping the permit unrecorded counts as an abandoned call.
    pub fn acquire(self: &Arc<Self>) -> Result<BreakerPermit, ProviderError> {
        Ok(BreakerPermit {
            trial: self.admit()?,
            breaker: Arc::clone(self),
            recorded: false,
        })
    }

    /// Decide admission; `Ok(true)` marks the half-open trial call
    fn admit(&self) -> Result<bool, ProviderError> {
        let mut inner = self.lock();
        let now = Instant::now();

        let trial = match inner.state {
            CircuitState::Closed => false,
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|opened| now.duration_since(opened))
                    .unwrap_or_default();
                if elapsed < self.config.reset_timeout {
                    return Err(ProviderError::circuit_open(self.name.clone()));
                }
                self.transition(&mut inner, CircuitState::HalfOpen);
                inner.trial_in_flight = true;
                true
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    return Err(ProviderError::circuit_open(self.name.clone()));
                }
                inner.trial_in_flight = true;
                true
            }
        };

        Ok(trial)
    }

    fn abandon(&self, trial: bool) {
        if trial {
            let mut inner = self.lock();
            inner.trial_in_flight = false;
            debug!(provider = %self.name, "Half-open trial abandoned");
        }
    }

    fn on_outcome(&self, trial: bool, success: bool) {
        let mut inner = self.lock();
        let now = Instant::now();

        if trial {
            inner.trial_in_flight = false;
            if success {
                inner.outcomes.clear();
                inner.opened_at = None;
                self.transition(&mut inner, CircuitState::Closed);
            } else {
                inner.opened_at = Some(now);
                self.transition(&mut inner, CircuitState::Open);
            }
            return;
        }

        // A call admitted while closed may finish after the circuit already opened.
        if inner.state != CircuitState::Closed {
            return;
        }

        inner.outcomes.push_back((now, success));
        self.prune(&mut inner, now);

        let (total, failures) = Self::counts(&inner);
        if total >= self.config.minimum_volume
            && failures as f64 / total as f64 > self.config.failure_rate_threshold
        {
            inner.opened_at = Some(now);
            warn!(
                provider = %self.name,
                failures,
                total,
                "Circuit breaker opening"
            );
            self.transition(&mut inner, CircuitState::Open);
        }
    }

    fn prune(&self, inner: &mut BreakerInner, now: Instant) {
        while let Some((at, _)) = inner.outcomes.front() {
            if now.duration_since(*at) > self.config.rolling_window {
                inner.outcomes.pop_front();
            } else {
                break;
            }
        }
    }

    fn counts(inner: &BreakerInner) -> (u32, u32) {
        let total = inner.outcomes.len() as u32;
        let failures = inner.outcomes.iter().filter(|(_, ok)| !ok).count() as u32;
        (total, failures)
    }

    fn transition(&self, inner: &mut BreakerInner, to: CircuitState) {
        if inner.state == to {
            return;
        }
        let from = inner.state;
        inner.state = to;
        inner.last_transition = Utc::now();

        match to {
            CircuitState::Open => {
                warn!(provider = %self.name, %from, "Circuit breaker is now open")
            }
            CircuitState::HalfOpen | CircuitState::Closed => {
                info!(provider = %self.name, %from, %to, "Circuit breaker state changed")
            }
        }
    }

    /// Get current circuit breaker state
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Get current metrics
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let mut inner = self.lock();
        self.prune(&mut inner, Instant::now());
        let (request_count, failure_count) = Self::counts(&inner);
        CircuitBreakerMetrics {
            state: inner.state,
            failure_count,
            request_count,
            last_transition: inner.last_transition,
        }
    }

    /// Reset the circuit breaker
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.outcomes.clear();
        inner.opened_at = None;
        inner.trial_in_flight = false;
        self.transition(&mut inner, CircuitState::Closed);
        debug!(provider = %self.name, "Circuit breaker reset");
    }
}
