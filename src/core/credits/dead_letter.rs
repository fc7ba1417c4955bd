//! Reconciliation queue for failed settlements

use super::types::FailedSettlement;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::warn;

/// Where settlements the ledger rejected are parked until an operator or a reconciliation
/// job replays them
pub trait SettlementDeadLetters: Send + Sync {
    fn push(&self, failed: FailedSettlement);

    /// Take every queued entry, oldest first
    fn drain(&self) -> Vec<FailedSettlement>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded in-memory queue; the oldest entry is dropped when full
#[derive(Debug)]
pub struct InMemoryDeadLetters {
    capacity: usize,
    queue: Mutex<VecDeque<FailedSettlement>>,
}

impl InMemoryDeadLetters {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl SettlementDeadLetters for InMemoryDeadLetters {
    fn push(&self, failed: FailedSettlement) {
        let mut queue = self.queue.lock();
        if queue.len() >= self.capacity {
            if let Some(dropped) = queue.pop_front() {
                warn!(
                    target: "billing",
                    user_id = %dropped.user_id,
                    request_id = %dropped.request_id,
                    credits = dropped.credits,
                    "Settlement dead-letter queue full, dropping oldest entry"
                );
            }
        }
        queue.push_back(failed);
    }

    fn drain(&self) -> Vec<FailedSettlement> {
        self.queue.lock().drain(..).collect()
    }

    fn len(&self) -> usize {
        self.queue.lock().len()
    }
}
