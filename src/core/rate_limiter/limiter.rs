//! Per-user request and token counters
//!
//! Fixed one-minute windows that start with a user's first request. The limit decision is
//! made elsewhere ([`CapabilityMatrix::check_rate_limit`]); this type only counts.
//!
//! [`CapabilityMatrix::check_rate_limit`]: crate::auth::CapabilityMatrix::check_rate_limit

use super::types::UsageWindow;
use crate::auth::{RateLimitDecision, UsageSnapshot};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

/// Usage counters keyed by user id
#[derive(Debug)]
pub struct UsageTracker {
    windows: DashMap<String, UsageWindow>,
    window: chrono::Duration,
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageTracker {
    /// One-minute windows
    pub fn new() -> Self {
        Self::with_window(chrono::Duration::seconds(60))
    }

    pub fn with_window(window: chrono::Duration) -> Self {
        Self {
            windows: DashMap::new(),
            window,
        }
    }

    /// Current usage of `user_id`
    pub fn snapshot(&self, user_id: &str) -> UsageSnapshot {
        self.snapshot_at(user_id, Utc::now())
    }

    pub fn snapshot_at(&self, user_id: &str, now: DateTime<Utc>) -> UsageSnapshot {
        match self.windows.get(user_id) {
            Some(w) if !w.is_expired(now, self.window) => UsageSnapshot {
                requests: w.requests,
                tokens: w.tokens,
                window_start: w.start,
            },
            _ => UsageSnapshot::empty(now),
        }
    }

    /// Count one request and `tokens` against the current window
    pub fn record(&self, user_id: &str, tokens: u64) {
        self.record_at(user_id, tokens, Utc::now());
    }

    pub fn record_at(&self, user_id: &str, tokens: u64, now: DateTime<Utc>) {
        let mut entry = self
            .windows
            .entry(user_id.to_string())
            .or_insert_with(|| UsageWindow::new(now));
        if entry.is_expired(now, self.window) {
            *entry = UsageWindow::new(now);
        }
        entry.requests = entry.requests.saturating_add(1);
        entry.tokens = entry.tokens.saturating_add(tokens);
    }

    /// Check and count in one step. `check` sees the snapshot under the user's entry lock,
    /// so concurrent requests of one user cannot both pass on the same count.
    pub fn admit<F>(&self, user_id: &str, tokens: u64, check: F) -> RateLimitDecision
    where
        F: FnOnce(&UsageSnapshot) -> RateLimitDecision,
    {
        self.admit_at(user_id, tokens, Utc::now(), check)
    }

    pub fn admit_at<F>(
        &self,
        user_id: &str,
        tokens: u64,
        now: DateTime<Utc>,
        check: F,
    ) -> RateLimitDecision
    where
        F: FnOnce(&UsageSnapshot) -> RateLimitDecision,
    {
        let mut entry = self
            .windows
            .entry(user_id.to_string())
            .or_insert_with(|| UsageWindow::new(now));
        if entry.is_expired(now, self.window) {
            *entry = UsageWindow::new(now);
        }

        let snapshot = UsageSnapshot {
            requests: entry.requests,
            tokens: entry.tokens,
            window_start: entry.start,
        };
        let decision = check(&snapshot);
        if decision.is_allowed() {
            entry.requests = entry.requests.saturating_add(1);
            entry.tokens = entry.tokens.saturating_add(tokens);
        }
        decision
    }

    /// Drop expired windows; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.windows.len();
        self.windows.retain(|_, w| !w.is_expired(now, self.window));
        let purged = before.saturating_sub(self.windows.len());
        if purged > 0 {
            debug!(purged, "Purged expired usage windows");
        }
        purged
    }

    pub fn tracked_users(&self) -> usize {
        self.windows.len()
    }
}
