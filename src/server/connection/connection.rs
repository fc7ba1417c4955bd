//! A single live client connection

use super::transport::{CloseSignal, Transport};
use crate::auth::AuthenticatedUser;
use crate::core::types::GatewayRequest;
use crate::server::protocol::ServerMessage;
use crate::utils::error::{GatewayError, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::AbortHandle;

/// In-flight request bookkeeping
#[derive(Debug)]
pub struct PendingRequest {
    pub request: Arc<GatewayRequest>,
    pub started_at: DateTime<Utc>,
    abort: Option<AbortHandle>,
}

impl PendingRequest {
    fn abort(&self) {
        if let Some(handle) = &self.abort {
            handle.abort();
        }
    }
}

/// Owned by the [`ConnectionManager`](super::ConnectionManager) for its whole lifetime
#[derive(Debug)]
pub struct Connection {
    id: String,
    user: AuthenticatedUser,
    transport: Arc<dyn Transport>,
    connected_at: DateTime<Utc>,
    last_activity: Mutex<DateTime<Utc>>,
    alive: AtomicBool,
    pending: Mutex<HashMap<String, PendingRequest>>,
    close_signal: CloseSignal,
}

impl Connection {
    pub(super) fn new(id: String, user: AuthenticatedUser, transport: Arc<dyn Transport>) -> Self {
        let now = Utc::now();
        Self {
            id,
            user,
            transport,
            connected_at: now,
            last_activity: Mutex::new(now),
            alive: AtomicBool::new(true),
            pending: Mutex::new(HashMap::new()),
            close_signal: CloseSignal::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user(&self) -> &AuthenticatedUser {
        &self.user
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.lock()
    }

    pub fn touch(&self) {
        *self.last_activity.lock() = Utc::now();
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub(super) fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    /// Resolves once the connection has been removed from its manager
    pub async fn closed(&self) {
        self.close_signal.wait().await
    }

    pub fn is_closed(&self) -> bool {
        self.close_signal.is_fired()
    }

    pub(super) fn mark_closed(&self) {
        self.close_signal.fire();
    }

    /// Serialize and write one message
    pub async fn send(&self, message: &ServerMessage) -> Result<()> {
        if !self.transport.is_writable() {
            return Err(GatewayError::transport(format!(
                "Connection {} is not writable",
                self.id
            )));
        }
        let text = message.to_text()?;
        self.transport.send_text(text).await
    }

    // ==================== Pending requests ====================

    pub fn add_pending(&self, request: Arc<GatewayRequest>) -> Result<()> {
        let mut pending = self.pending.lock();
        if pending.contains_key(&request.id) {
            return Err(GatewayError::conflict(format!(
                "Request '{}' is already in flight",
                request.id
            )));
        }
        pending.insert(
            request.id.clone(),
            PendingRequest {
                request,
                started_at: Utc::now(),
                abort: None,
            },
        );
        Ok(())
    }

    /// Returns `false` when the request already left the map
    pub fn attach_abort(&self, request_id: &str, handle: AbortHandle) -> bool {
        match self.pending.lock().get_mut(request_id) {
            Some(entry) => {
                entry.abort = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Take the entry out of the map. Whoever gets `Some` owns the request's terminal message.
    pub fn take_pending(&self, request_id: &str) -> Option<Arc<GatewayRequest>> {
        self.pending.lock().remove(request_id).map(|p| p.request)
    }

    /// Take the entry and abort the task serving it
    pub fn cancel_pending(&self, request_id: &str) -> Option<Arc<GatewayRequest>> {
        let entry = self.pending.lock().remove(request_id)?;
        entry.abort();
        Some(entry.request)
    }

    pub fn is_pending(&self, request_id: &str) -> bool {
        self.pending.lock().contains_key(request_id)
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.pending.lock().keys().cloned().collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Abort everything still in flight; returns how many requests were dropped
    pub(super) fn abort_all_pending(&self) -> usize {
        let drained: Vec<PendingRequest> = self.pending.lock().drain().map(|(_, p)| p).collect();
        for entry in &drained {
            entry.abort();
        }
        drained.len()
    }
}
