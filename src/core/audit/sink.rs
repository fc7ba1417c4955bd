//! Usage sinks
//!
//! Recording is fire-and-forget: a slow or broken sink never delays request handling.

use super::types::UsageRecord;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Receives one record per finished request
pub trait UsageSink: Send + Sync {
    fn record(&self, record: UsageRecord);
}

/// Writes records as structured events with target `usage`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingUsageSink;

impl UsageSink for TracingUsageSink {
    fn record(&self, record: UsageRecord) {
        let usage = record.usage.unwrap_or_default();
        info!(
            target: "usage",
            user_id = %record.user_id,
            connection_id = %record.connection_id,
            request_id = %record.request_id,
            provider = record.provider.as_deref().unwrap_or("-"),
            model = %record.model,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            credits = record.credits,
            duration_ms = record.duration_ms,
            success = record.success,
            error = record.error.as_deref().unwrap_or(""),
            "request completed"
        );
    }
}

/// Bounded channel in front of another sink. Records are dropped with a warning when the
/// channel is full.
#[derive(Debug)]
pub struct ChannelUsageSink {
    sender: mpsc::Sender<UsageRecord>,
    dropped: AtomicU64,
}

impl ChannelUsageSink {
    /// Spawn the draining task; must be called inside a tokio runtime
    pub fn spawn(capacity: usize, inner: Arc<dyn UsageSink>) -> Self {
        let (sender, mut receiver) = mpsc::channel::<UsageRecord>(capacity.max(1));

        tokio::spawn(async move {
            while let Some(record) = receiver.recv().await {
                inner.record(record);
            }
        });

        Self {
            sender,
            dropped: AtomicU64::new(0),
        }
    }

    /// Records lost to a full or closed channel
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl UsageSink for ChannelUsageSink {
    fn record(&self, record: UsageRecord) {
        match self.sender.try_send(record) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(record)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(request_id = %record.request_id, "Usage sink buffer full, record dropped");
            }
            Err(mpsc::error::TrySendError::Closed(record)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                error!(request_id = %record.request_id, "Usage sink channel closed");
            }
        }
    }
}
