//! Composable retry / fallback policies
//!
//! Both the adapters' rate-limit retry and the router's primary→fallback selection are the same
//! loop: attempt, classify the failure, then retry the same candidate, move on to the next one,
//! or give up. The loop lives in [`run_with_recovery`]; the decision lives in a [`RecoveryPolicy`].

use super::types::RetryConfig;
use crate::core::providers::unified_provider::ProviderError;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// What to do after a failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Try the same candidate again after the delay
    Retry(Duration),
    /// Move on to the next candidate
    Fallback,
    /// Stop and surface the failures
    GiveUp,
}

/// Failure classifier deciding the next step
pub trait RecoveryPolicy<E> {
    /// `attempt` counts attempts made against the current candidate, starting at 1
    fn on_failure(&self, attempt: u32, error: &E) -> RecoveryAction;
}

/// Every failure observed before the policy gave up or candidates ran out, in order
#[derive(Debug)]
pub struct Exhausted<E> {
    pub failures: Vec<(usize, E)>,
}

impl<E> Exhausted<E> {
    /// Last error seen, if any attempt was made at all
    pub fn into_last(self) -> Option<E> {
        self.failures.into_iter().last().map(|(_, e)| e)
    }
}

/// Drive `op` over candidates `0..candidates` according to `policy`.
///
/// `op` receives the candidate index and is invoked once per attempt.
pub async fn run_with_recovery<T, E, P, F, Fut>(
    policy: &P,
    candidates: usize,
    mut op: F,
) -> Result<T, Exhausted<E>>
where
    P: RecoveryPolicy<E> + ?Sized,
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut failures = Vec::new();
    let mut candidate = 0;
    let mut attempt = 1u32;

    while candidate < candidates {
        match op(candidate).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let action = policy.on_failure(attempt, &error);
                failures.push((candidate, error));
                match action {
                    RecoveryAction::Retry(delay) => {
                        debug!(candidate, attempt, ?delay, "Retrying after failure");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    RecoveryAction::Fallback => {
                        debug!(candidate, "Falling back to next candidate");
                        candidate += 1;
                        attempt = 1;
                    }
                    RecoveryAction::GiveUp => break,
                }
            }
        }
    }

    Err(Exhausted { failures })
}

/// Retries rate-limited provider calls with exponential backoff; anything else gives up at once
#[derive(Debug, Clone)]
pub struct RetryOnRateLimit {
    config: RetryConfig,
}

impl RetryOnRateLimit {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }
}

impl RecoveryPolicy<ProviderError> for RetryOnRateLimit {
    fn on_failure(&self, attempt: u32, error: &ProviderError) -> RecoveryAction {
        if !error.is_rate_limited() || attempt >= self.config.max_attempts {
            return RecoveryAction::GiveUp;
        }

        let backoff = self.config.backoff(attempt);
        match error.retry_after().map(Duration::from_secs) {
            // Waiting longer than max_delay would hold the caller; surface the hint instead
            Some(hint) if hint > self.config.max_delay => {
                debug!(?hint, max_delay = ?self.config.max_delay, "Retry-After exceeds max delay");
                RecoveryAction::GiveUp
            }
            Some(hint) => RecoveryAction::Retry(backoff.max(hint)),
            None => RecoveryAction::Retry(backoff),
        }
    }
}

/// Moves to the next candidate on any failure
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackOnFailure;

impl<E> RecoveryPolicy<E> for FallbackOnFailure {
    fn on_failure(&self, _attempt: u32, _error: &E) -> RecoveryAction {
        RecoveryAction::Fallback
    }
}
