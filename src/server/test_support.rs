//! Test doubles shared by the server unit tests

use crate::server::connection::Transport;
use crate::server::protocol::ServerMessage;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Transport that keeps every frame it was asked to write
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<String>>,
    closed: AtomicBool,
    pub pings: AtomicUsize,
    pub closes: AtomicUsize,
}

impl RecordingTransport {
    pub fn closed() -> Self {
        let transport = Self::default();
        transport.closed.store(true, Ordering::SeqCst);
        transport
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub fn messages(&self) -> Vec<ServerMessage> {
        self.sent()
            .iter()
            .map(|text| serde_json::from_str(text).expect("outbound frame is a ServerMessage"))
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn is_writable(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    async fn send_text(&self, text: String) -> Result<()> {
        if !self.is_writable() {
            return Err(GatewayError::transport("closed"));
        }
        self.sent.lock().push(text);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn pong(&self, _payload: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn close(&self, _reason: Option<String>) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }
}
