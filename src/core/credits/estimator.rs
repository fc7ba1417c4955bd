//! Token estimation strategies
//!
//! No real tokenizer is involved: the heuristic counts characters and scales prompt tokens by a
//! per-family completion ratio. Other strategies plug in through [`TokenEstimator`].

use crate::config::{CompletionRatio, CreditConfig};
use crate::core::types::GatewayRequest;
use std::fmt::Debug;

/// Approximates token counts for a request before it runs
pub trait TokenEstimator: Send + Sync + Debug {
    /// Tokens in the prompt
    fn prompt_tokens(&self, request: &GatewayRequest) -> u32;

    /// Expected completion tokens for `prompt_tokens` of input to `model`, before any
    /// caller-requested cap
    fn completion_tokens(&self, model: &str, prompt_tokens: u32) -> u32;
}

/// Characters-per-token heuristic with per-family completion ratios
#[derive(Debug, Clone)]
pub struct HeuristicTokenEstimator {
    chars_per_token: f64,
    default_ratio: f64,
    /// Sorted longest prefix first
    ratios: Vec<CompletionRatio>,
}

impl HeuristicTokenEstimator {
    pub fn new(chars_per_token: f64, default_ratio: f64, mut ratios: Vec<CompletionRatio>) -> Self {
        ratios.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self {
            chars_per_token: if chars_per_token > 0.0 {
                chars_per_token
            } else {
                4.0
            },
            default_ratio: default_ratio.max(0.0),
            ratios,
        }
    }

    pub fn from_config(config: &CreditConfig) -> Self {
        Self::new(
            config.chars_per_token,
            config.default_completion_ratio,
            config.completion_ratios.clone(),
        )
    }

    /// Tokens for `chars` characters of text
    pub fn tokens_for_chars(&self, chars: usize) -> u32 {
        let tokens = (chars as f64 / self.chars_per_token).ceil();
        tokens.min(u32::MAX as f64) as u32
    }

    /// Longest matching prefix ratio
    pub fn ratio_for(&self, model: &str) -> f64 {
        self.ratios
            .iter()
            .find(|r| model.starts_with(&r.prefix))
            .map(|r| r.ratio)
            .unwrap_or(self.default_ratio)
    }
}

impl TokenEstimator for HeuristicTokenEstimator {
    fn prompt_tokens(&self, request: &GatewayRequest) -> u32 {
        self.tokens_for_chars(request.prompt_text_len())
    }

    fn completion_tokens(&self, model: &str, prompt_tokens: u32) -> u32 {
        let tokens = (prompt_tokens as f64 * self.ratio_for(model)).ceil();
        tokens.min(u32::MAX as f64) as u32
    }
}
