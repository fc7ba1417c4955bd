//! Usage tracker types

use chrono::{DateTime, Utc};

/// Counters of one user's current window
#[derive(Debug, Clone)]
pub(super) struct UsageWindow {
    pub(super) start: DateTime<Utc>,
    pub(super) requests: u32,
    pub(super) tokens: u64,
}

impl UsageWindow {
    pub(super) fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            requests: 0,
            tokens: 0,
        }
    }

    pub(super) fn is_expired(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        now - self.start >= window
    }
}
