//! Credit estimation and ledger configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Credit estimation, price table and ledger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditConfig {
    /// Characters counted as one token by the heuristic estimator
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: f64,
    /// Completion/prompt ratio for models matching no prefix
    #[serde(default = "default_completion_ratio")]
    pub default_completion_ratio: f64,
    /// Completion/prompt ratios by model prefix (longest prefix wins)
    #[serde(default = "default_completion_ratios")]
    pub completion_ratios: Vec<CompletionRatio>,
    /// Price for models matching no prefix
    #[serde(default = "default_credits_per_1k")]
    pub default_credits_per_1k_tokens: f64,
    /// Prices by model prefix (longest prefix wins)
    #[serde(default = "default_prices")]
    pub prices: Vec<ModelPrice>,
    /// External ledger; without it every credit check fails closed
    #[serde(default)]
    pub ledger: Option<LedgerConfig>,
    /// Failed settlements kept for reconciliation before the oldest are dropped
    #[serde(default = "default_dead_letter_capacity")]
    pub dead_letter_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRatio {
    pub prefix: String,
    pub ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPrice {
    pub prefix: String,
    pub credits_per_1k_tokens: f64,
}

/// External ledger endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub base_url: String,
    #[serde(default = "default_ledger_timeout")]
    pub timeout_secs: u64,
    /// Bearer token for the ledger; `${ENV_VAR}` allowed
    #[serde(default)]
    pub service_token: Option<String>,
}

impl LedgerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_chars_per_token() -> f64 {
    4.0
}

fn default_completion_ratio() -> f64 {
    1.0
}

fn default_completion_ratios() -> Vec<CompletionRatio> {
    [
        ("gpt-4", 1.0),
        ("gpt-3.5", 0.75),
        ("claude", 1.2),
        ("gemini", 0.9),
    ]
    .into_iter()
    .map(|(prefix, ratio)| CompletionRatio {
        prefix: prefix.to_string(),
        ratio,
    })
    .collect()
}

fn default_credits_per_1k() -> f64 {
    2.0
}

fn default_prices() -> Vec<ModelPrice> {
    [
        ("gpt-4o", 5.0),
        ("gpt-4", 30.0),
        ("gpt-3.5", 1.5),
        ("claude-3-opus", 45.0),
        ("claude-3-haiku", 1.0),
        ("claude", 8.0),
        ("gemini-1.5-pro", 5.0),
        ("gemini", 1.0),
    ]
    .into_iter()
    .map(|(prefix, credits)| ModelPrice {
        prefix: prefix.to_string(),
        credits_per_1k_tokens: credits,
    })
    .collect()
}

fn default_ledger_timeout() -> u64 {
    10
}

fn default_dead_letter_capacity() -> usize {
    1000
}

impl Default for CreditConfig {
    fn default() -> Self {
        Self {
            chars_per_token: default_chars_per_token(),
            default_completion_ratio: default_completion_ratio(),
            completion_ratios: default_completion_ratios(),
            default_credits_per_1k_tokens: default_credits_per_1k(),
            prices: default_prices(),
            ledger: None,
            dead_letter_capacity: default_dead_letter_capacity(),
        }
    }
}
