//! Transport that records outbound frames

use async_trait::async_trait;
use litellm_ws_gateway::server::Transport;
use litellm_ws_gateway::{Result, ServerMessage};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct RecordingTransport {
    frames: Mutex<Vec<String>>,
    open: AtomicBool,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
            open: AtomicBool::new(true),
        }
    }
}

impl RecordingTransport {
    pub fn messages(&self) -> Vec<ServerMessage> {
        self.frames
            .lock()
            .iter()
            .map(|frame| serde_json::from_str(frame).expect("server frame is valid JSON"))
            .collect()
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn is_writable(&self) -> bool {
        self.is_open()
    }

    async fn send_text(&self, text: String) -> Result<()> {
        self.frames.lock().push(text);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn pong(&self, _payload: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn close(&self, _reason: Option<String>) {
        self.open.store(false, Ordering::SeqCst);
    }
}
