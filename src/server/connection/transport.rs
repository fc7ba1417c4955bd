//! Client transport abstraction

use crate::utils::error::{GatewayError, Result};
use actix_ws::{CloseCode, CloseReason, Session};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, Notify};
use tracing::debug;

/// Outbound half of a client connection
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// `false` once the transport is closing or closed
    fn is_writable(&self) -> bool;

    async fn send_text(&self, text: String) -> Result<()>;

    async fn ping(&self) -> Result<()>;

    async fn pong(&self, payload: &[u8]) -> Result<()>;

    /// Terminate the transport. Safe to call more than once.
    async fn close(&self, reason: Option<String>);
}

/// Fired once when a connection is removed, so its reader loop can stop
#[derive(Debug, Default)]
pub struct CloseSignal {
    fired: AtomicBool,
    notify: Notify,
}

impl CloseSignal {
    pub fn fire(&self) {
        if !self.fired.swap(true, Ordering::AcqRel) {
            self.notify.notify_waiters();
            self.notify.notify_one();
        }
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    pub async fn wait(&self) {
        while !self.is_fired() {
            self.notify.notified().await;
        }
    }
}

/// actix-ws session
pub struct WsTransport {
    session: Mutex<Option<Session>>,
    open: AtomicBool,
}

impl std::fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsTransport")
            .field("open", &self.open.load(Ordering::Relaxed))
            .finish()
    }
}

impl WsTransport {
    pub fn new(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
            open: AtomicBool::new(true),
        }
    }

    fn closed(&self) -> GatewayError {
        self.open.store(false, Ordering::Release);
        GatewayError::transport("WebSocket session is closed")
    }
}

#[async_trait]
impl Transport for WsTransport {
    fn is_writable(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn send_text(&self, text: String) -> Result<()> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or_else(|| self.closed())?;
        session.text(text).await.map_err(|_| self.closed())
    }

    async fn ping(&self) -> Result<()> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or_else(|| self.closed())?;
        session.ping(b"").await.map_err(|_| self.closed())
    }

    async fn pong(&self, payload: &[u8]) -> Result<()> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or_else(|| self.closed())?;
        session.pong(payload).await.map_err(|_| self.closed())
    }

    async fn close(&self, reason: Option<String>) {
        self.open.store(false, Ordering::Release);
        let session = self.session.lock().await.take();
        if let Some(session) = session {
            let reason = reason.map(|description| CloseReason {
                code: CloseCode::Normal,
                description: Some(description),
            });
            if session.close(reason).await.is_err() {
                debug!("WebSocket session already closed");
            }
        }
    }
}
