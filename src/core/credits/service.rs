//! Credit pre-check and post-response settlement

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};

use super::calculator::CreditEstimator;
use super::dead_letter::{InMemoryDeadLetters, SettlementDeadLetters};
use super::ledger::{HttpLedgerClient, LedgerClient};
use super::types::{CreditEstimation, FailedSettlement, SettlementOutcome};
use crate::config::CreditConfig;
use crate::core::types::GatewayRequest;
use crate::utils::error::{GatewayError, Result};

/// Credit checks against the external ledger
#[derive(Clone)]
pub struct CreditService {
    estimator: CreditEstimator,
    ledger: Option<Arc<dyn LedgerClient>>,
    dead_letters: Arc<dyn SettlementDeadLetters>,
}

impl std::fmt::Debug for CreditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditService")
            .field("estimator", &self.estimator)
            .field("ledger_configured", &self.ledger.is_some())
            .field("dead_letters", &self.dead_letters.len())
            .finish()
    }
}

impl CreditService {
    pub fn new(
        estimator: CreditEstimator,
        ledger: Option<Arc<dyn LedgerClient>>,
        dead_letters: Arc<dyn SettlementDeadLetters>,
    ) -> Self {
        Self {
            estimator,
            ledger,
            dead_letters,
        }
    }

    /// HTTP ledger (when configured) and an in-memory dead-letter queue
    pub fn from_config(config: &CreditConfig) -> Result<Self> {
        let ledger: Option<Arc<dyn LedgerClient>> = match &config.ledger {
            Some(ledger) => Some(Arc::new(HttpLedgerClient::new(ledger)?)),
            None => {
                warn!("No credit ledger configured; every request will be rejected");
                None
            }
        };
        Ok(Self::new(
            CreditEstimator::from_config(config),
            ledger,
            Arc::new(InMemoryDeadLetters::new(config.dead_letter_capacity)),
        ))
    }

    pub fn estimator(&self) -> &CreditEstimator {
        &self.estimator
    }

    pub fn dead_letters(&self) -> &Arc<dyn SettlementDeadLetters> {
        &self.dead_letters
    }

    pub fn estimate(&self, request: &GatewayRequest) -> CreditEstimation {
        self.estimator.estimate(request)
    }

    /// Compare the user's balance with the estimate. Any failure to read the balance is
    /// treated as insufficient.
    pub async fn check_sufficient_credits(
        &self,
        user_id: &str,
        request: &GatewayRequest,
    ) -> Result<CreditEstimation> {
        let estimation = self.estimate(request);
        let required = estimation.estimated_credits;

        let Some(ledger) = &self.ledger else {
            return Err(GatewayError::InsufficientCredits {
                reason: "Credit balance could not be verified".to_string(),
                required,
                available: None,
            });
        };

        let balance = match ledger.balance(user_id).await {
            Ok(balance) => balance,
            Err(e) => {
                error!(
                    target: "billing",
                    user_id,
                    request_id = %request.id,
                    error = %e,
                    "Ledger balance lookup failed, rejecting request"
                );
                return Err(GatewayError::InsufficientCredits {
                    reason: "Credit balance could not be verified".to_string(),
                    required,
                    available: None,
                });
            }
        };

        if balance < required {
            debug!(user_id, balance, required, "Insufficient credits");
            return Err(GatewayError::InsufficientCredits {
                reason: format!(
                    "Insufficient credits: {:.4} required, {:.4} available",
                    required, balance
                ),
                required,
                available: Some(balance),
            });
        }

        Ok(estimation)
    }

    /// Charge the real cost of a completed request. Never fails: a rejected debit is logged
    /// as a billing incident and queued for reconciliation.
    pub async fn settle(
        &self,
        user_id: &str,
        request_id: &str,
        actual_tokens_used: u32,
        model: &str,
    ) -> SettlementOutcome {
        let credits = self.estimator.cost(model, actual_tokens_used);
        if actual_tokens_used == 0 || credits <= 0.0 {
            return SettlementOutcome::Skipped;
        }

        let description = format!(
            "LLM usage: {} ({} tokens), request {}",
            model, actual_tokens_used, request_id
        );

        let result = match &self.ledger {
            Some(ledger) => ledger.debit(user_id, credits, &description).await,
            None => Err(GatewayError::ledger("No ledger configured")),
        };

        match result {
            Ok(new_balance) => {
                debug!(user_id, request_id, credits, new_balance, "Settled request");
                SettlementOutcome::Settled {
                    credits,
                    new_balance,
                }
            }
            Err(e) => {
                error!(
                    target: "billing",
                    user_id,
                    request_id,
                    model,
                    tokens = actual_tokens_used,
                    credits,
                    error = %e,
                    "Settlement failed, queued for reconciliation"
                );
                self.dead_letters.push(FailedSettlement {
                    user_id: user_id.to_string(),
                    request_id: request_id.to_string(),
                    model: model.to_string(),
                    tokens: actual_tokens_used,
                    credits,
                    error: e.to_string(),
                    failed_at: Utc::now(),
                });
                SettlementOutcome::Failed { credits }
            }
        }
    }
}
