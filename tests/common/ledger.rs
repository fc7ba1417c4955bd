//! In-memory credit ledger

use async_trait::async_trait;
use litellm_ws_gateway::core::credits::LedgerClient;
use litellm_ws_gateway::{GatewayError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;

/// One posted debit
#[derive(Debug, Clone, PartialEq)]
pub struct Debit {
    pub user_id: String,
    pub amount: f64,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct FakeLedger {
    balances: Mutex<HashMap<String, f64>>,
    debits: Mutex<Vec<Debit>>,
}

impl FakeLedger {
    pub fn with_balance(user_id: &str, balance: f64) -> Self {
        let ledger = Self::default();
        ledger.balances.lock().insert(user_id.to_string(), balance);
        ledger
    }

    pub fn balance_of(&self, user_id: &str) -> f64 {
        self.balances.lock().get(user_id).copied().unwrap_or(0.0)
    }

    pub fn debits(&self) -> Vec<Debit> {
        self.debits.lock().clone()
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn balance(&self, user_id: &str) -> Result<f64> {
        self.balances
            .lock()
            .get(user_id)
            .copied()
            .ok_or_else(|| GatewayError::ledger(format!("unknown account {}", user_id)))
    }

    async fn debit(&self, user_id: &str, amount: f64, description: &str) -> Result<f64> {
        let mut balances = self.balances.lock();
        let balance = balances.entry(user_id.to_string()).or_insert(0.0);
        *balance -= amount;
        self.debits.lock().push(Debit {
            user_id: user_id.to_string(),
            amount,
            description: description.to_string(),
        });
        Ok(*balance)
    }
}
