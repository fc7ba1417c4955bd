//! Connection registry
//!
//! Connections are indexed by id and by owning user. Both indexes live behind one lock so a
//! removal never leaves a stale entry in either.

use super::connection::Connection;
use super::transport::Transport;
use crate::auth::AuthenticatedUser;
use crate::core::types::GatewayRequest;
use crate::server::protocol::ServerMessage;
use crate::utils::error::{GatewayError, Result};
use crate::utils::generate_id;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default)]
struct Indexes {
    by_id: HashMap<String, Arc<Connection>>,
    by_user: HashMap<String, HashSet<String>>,
}

/// Result of one heartbeat round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeartbeatReport {
    /// Connections removed because they missed the previous probe
    pub swept: usize,
    /// Connections probed this round
    pub probed: usize,
}

#[derive(Debug, Default)]
pub struct ConnectionManager {
    indexes: RwLock<Indexes>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an authenticated connection under a fresh id
    pub fn create(&self, transport: Arc<dyn Transport>, user: AuthenticatedUser) -> Arc<Connection> {
        let id = generate_id();
        let user_id = user.id.clone();
        let connection = Arc::new(Connection::new(id.clone(), user, transport));

        {
            let mut indexes = self.indexes.write();
            indexes.by_id.insert(id.clone(), Arc::clone(&connection));
            indexes.by_user.entry(user_id.clone()).or_default().insert(id.clone());
        }

        info!(connection_id = %id, user_id = %user_id, "Connection registered");
        connection
    }

    pub fn get(&self, id: &str) -> Option<Arc<Connection>> {
        self.indexes.read().by_id.get(id).cloned()
    }

    /// Remove a connection and abort its in-flight requests. Returns `false` when the id was
    /// already gone; racing callers see exactly one `true`.
    pub fn remove(&self, id: &str) -> bool {
        let removed = {
            let mut indexes = self.indexes.write();
            let removed = indexes.by_id.remove(id);
            if let Some(connection) = &removed {
                let user_id = &connection.user().id;
                if let Some(ids) = indexes.by_user.get_mut(user_id) {
                    ids.remove(id);
                    if ids.is_empty() {
                        indexes.by_user.remove(user_id);
                    }
                }
            }
            removed
        };

        match removed {
            Some(connection) => {
                let aborted = connection.abort_all_pending();
                connection.mark_closed();
                info!(
                    connection_id = %id,
                    user_id = %connection.user().id,
                    aborted_requests = aborted,
                    "Connection removed"
                );
                true
            }
            None => {
                debug!(connection_id = %id, "Connection already removed");
                false
            }
        }
    }

    pub fn connections_for_user(&self, user_id: &str) -> Vec<Arc<Connection>> {
        let indexes = self.indexes.read();
        indexes
            .by_user
            .get(user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| indexes.by_id.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.indexes.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn user_count(&self) -> usize {
        self.indexes.read().by_user.len()
    }

    fn all(&self) -> Vec<Arc<Connection>> {
        self.indexes.read().by_id.values().cloned().collect()
    }

    // ==================== Liveness ====================

    pub fn mark_alive(&self, id: &str) -> bool {
        match self.get(id) {
            Some(connection) => {
                connection.set_alive(true);
                connection.touch();
                true
            }
            None => false,
        }
    }

    pub fn mark_not_alive(&self, id: &str) -> bool {
        match self.get(id) {
            Some(connection) => {
                connection.set_alive(false);
                true
            }
            None => false,
        }
    }

    /// Remove every connection that did not answer the last probe, closing its transport if it
    /// is still open
    pub async fn sweep_dead(&self) -> usize {
        let dead: Vec<Arc<Connection>> = self
            .all()
            .into_iter()
            .filter(|c| !c.is_alive())
            .collect();

        let mut swept = 0;
        for connection in dead {
            if !self.remove(connection.id()) {
                continue;
            }
            swept += 1;
            warn!(
                connection_id = %connection.id(),
                user_id = %connection.user().id,
                "Connection missed heartbeat, terminating"
            );
            if connection.transport().is_writable() {
                connection
                    .transport()
                    .close(Some("heartbeat timeout".to_string()))
                    .await;
            }
        }
        swept
    }

    /// Sweep connections that missed the previous probe, then probe the rest
    pub async fn heartbeat(&self) -> HeartbeatReport {
        let swept = self.sweep_dead().await;

        let live = self.all();
        for connection in &live {
            connection.set_alive(false);
            if let Err(e) = connection.transport().ping().await {
                debug!(connection_id = %connection.id(), error = %e, "Heartbeat ping failed");
            }
        }

        let report = HeartbeatReport {
            swept,
            probed: live.len(),
        };
        debug!(swept = report.swept, probed = report.probed, "Heartbeat round complete");
        report
    }

    // ==================== Pending requests ====================

    pub fn add_pending_request(&self, connection_id: &str, request: Arc<GatewayRequest>) -> Result<()> {
        self.get(connection_id)
            .ok_or_else(|| GatewayError::not_found(format!("Connection {}", connection_id)))?
            .add_pending(request)
    }

    pub fn attach_abort(&self, connection_id: &str, request_id: &str, handle: AbortHandle) -> bool {
        self.get(connection_id)
            .map(|c| c.attach_abort(request_id, handle))
            .unwrap_or(false)
    }

    pub fn remove_pending_request(
        &self,
        connection_id: &str,
        request_id: &str,
    ) -> Option<Arc<GatewayRequest>> {
        self.get(connection_id)?.take_pending(request_id)
    }

    pub fn cancel_pending_request(
        &self,
        connection_id: &str,
        request_id: &str,
    ) -> Option<Arc<GatewayRequest>> {
        let request = self.get(connection_id)?.cancel_pending(request_id)?;
        info!(connection_id, request_id, "Request cancelled");
        Some(request)
    }

    // ==================== Fan-out ====================

    /// Send to every connection the user holds; returns how many writes succeeded. Connections
    /// that are not writable are skipped.
    pub async fn broadcast(&self, user_id: &str, message: &ServerMessage) -> usize {
        let text = match message.to_text() {
            Ok(text) => text,
            Err(e) => {
                error!(user_id, error = %e, "Failed to serialize broadcast message");
                return 0;
            }
        };

        let mut delivered = 0;
        for connection in self.connections_for_user(user_id) {
            let transport = connection.transport();
            if !transport.is_writable() {
                debug!(connection_id = %connection.id(), "Skipping non-writable connection");
                continue;
            }
            match transport.send_text(text.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => debug!(connection_id = %connection.id(), error = %e, "Broadcast write failed"),
            }
        }
        delivered
    }

    /// Remove and close every connection
    pub async fn shutdown(&self) -> usize {
        let connections = self.all();
        let mut closed = 0;
        for connection in connections {
            if self.remove(connection.id()) {
                connection
                    .transport()
                    .close(Some("server shutting down".to_string()))
                    .await;
                closed += 1;
            }
        }
        info!(closed, "All connections closed");
        closed
    }
}
