//! Content buffering and usage accumulation

use crate::core::types::Usage;

const SENTENCE_BOUNDARIES: [char; 4] = ['.', '!', '?', '\n'];

/// Collects incremental text and releases it in sentence-sized pieces
#[derive(Debug)]
pub struct ChunkBuffer {
    pending: String,
    pending_chars: usize,
    threshold: usize,
}

impl ChunkBuffer {
    pub fn new(threshold: usize) -> Self {
        Self {
            pending: String::new(),
            pending_chars: 0,
            threshold: threshold.max(1),
        }
    }

    /// Append text. Returns everything buffered once the threshold is reached, otherwise
    /// the text up to and including the last sentence boundary, if any.
    pub fn push(&mut self, text: &str) -> Option<String> {
        if text.is_empty() {
            return None;
        }
        self.pending.push_str(text);
        self.pending_chars += text.chars().count();

        if self.pending_chars >= self.threshold {
            return self.flush();
        }

        let boundary = self.pending.rfind(SENTENCE_BOUNDARIES)?;
        // every boundary character is a single byte
        let rest = self.pending.split_off(boundary + 1);
        let ready = std::mem::replace(&mut self.pending, rest);
        self.pending_chars = self.pending.chars().count();
        Some(ready)
    }

    /// Release whatever is left
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        self.pending_chars = 0;
        Some(std::mem::take(&mut self.pending))
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Merges usage reported piecewise or in a side channel
#[derive(Debug, Default, Clone, Copy)]
pub struct UsageAccumulator {
    prompt: Option<u32>,
    completion: Option<u32>,
}

impl UsageAccumulator {
    pub fn set_prompt(&mut self, tokens: u32) {
        self.prompt = Some(tokens);
    }

    pub fn set_completion(&mut self, tokens: u32) {
        self.completion = Some(tokens);
    }

    pub fn set(&mut self, usage: Usage) {
        self.prompt = Some(usage.prompt_tokens);
        self.completion = Some(usage.completion_tokens);
    }

    /// Usage with the total recomputed, or `None` when the backend reported nothing
    pub fn usage(&self) -> Option<Usage> {
        if self.prompt.is_none() && self.completion.is_none() {
            return None;
        }
        Some(Usage::new(
            self.prompt.unwrap_or(0),
            self.completion.unwrap_or(0),
        ))
    }
}
