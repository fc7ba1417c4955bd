//! Credit types

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Pre-flight cost estimate. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CreditEstimation {
    pub prompt_tokens: u32,
    pub estimated_completion_tokens: u32,
    pub estimated_credits: f64,
}

impl CreditEstimation {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens
            .saturating_add(self.estimated_completion_tokens)
    }
}

/// A settlement the ledger did not accept, kept for reconciliation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedSettlement {
    pub user_id: String,
    pub request_id: String,
    pub model: String,
    pub tokens: u32,
    pub credits: f64,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

/// What `settle` did
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    /// Debited; carries the ledger's new balance
    Settled { credits: f64, new_balance: f64 },
    /// Nothing to charge
    Skipped,
    /// Debit failed and was queued for reconciliation
    Failed { credits: f64 },
}

impl SettlementOutcome {
    /// Credits the request cost, whether or not the debit went through
    pub fn credits(&self) -> f64 {
        match self {
            SettlementOutcome::Settled { credits, .. } | SettlementOutcome::Failed { credits } => {
                *credits
            }
            SettlementOutcome::Skipped => 0.0,
        }
    }
}
