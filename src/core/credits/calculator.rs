//! Credit calculation

use super::estimator::{HeuristicTokenEstimator, TokenEstimator};
use super::types::CreditEstimation;
use crate::config::{CreditConfig, ModelPrice};
use crate::core::types::GatewayRequest;
use std::sync::Arc;

/// Convert tokens to credits
pub fn tokens_to_credits(tokens: u32, credits_per_1k: f64) -> f64 {
    (tokens as f64 / 1000.0) * credits_per_1k
}

/// Per-model prices, matched by longest prefix
#[derive(Debug, Clone)]
pub struct PriceTable {
    default_per_1k: f64,
    prices: Vec<ModelPrice>,
}

impl PriceTable {
    pub fn new(default_per_1k: f64, mut prices: Vec<ModelPrice>) -> Self {
        prices.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self {
            default_per_1k,
            prices,
        }
    }

    pub fn per_1k(&self, model: &str) -> f64 {
        self.prices
            .iter()
            .find(|p| model.starts_with(&p.prefix))
            .map(|p| p.credits_per_1k_tokens)
            .unwrap_or(self.default_per_1k)
    }

    pub fn credits(&self, model: &str, tokens: u32) -> f64 {
        tokens_to_credits(tokens, self.per_1k(model))
    }
}

/// Turns a request into a [`CreditEstimation`]
#[derive(Debug, Clone)]
pub struct CreditEstimator {
    tokens: Arc<dyn TokenEstimator>,
    prices: PriceTable,
}

impl CreditEstimator {
    pub fn new(tokens: Arc<dyn TokenEstimator>, prices: PriceTable) -> Self {
        Self { tokens, prices }
    }

    /// Heuristic estimator and price table from config
    pub fn from_config(config: &CreditConfig) -> Self {
        Self::new(
            Arc::new(HeuristicTokenEstimator::from_config(config)),
            PriceTable::new(config.default_credits_per_1k_tokens, config.prices.clone()),
        )
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Estimate prompt and completion tokens and their cost. The completion estimate never
    /// exceeds the caller's `max_tokens`.
    pub fn estimate(&self, request: &GatewayRequest) -> CreditEstimation {
        let prompt_tokens = self.tokens.prompt_tokens(request);
        let mut completion = self.tokens.completion_tokens(&request.model, prompt_tokens);
        if let Some(max_tokens) = request.params.max_tokens {
            completion = completion.min(max_tokens);
        }

        let total = prompt_tokens.saturating_add(completion);
        CreditEstimation {
            prompt_tokens,
            estimated_completion_tokens: completion,
            estimated_credits: self.prices.credits(&request.model, total),
        }
    }

    /// Real cost of `tokens` actually used
    pub fn cost(&self, model: &str, tokens: u32) -> f64 {
        self.prices.credits(model, tokens)
    }
}
