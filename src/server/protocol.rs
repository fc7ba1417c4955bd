//! WebSocket wire protocol
//!
//! Inbound frames are JSON text: either a request (`"type": "chat" | "completion"`) or a
//! control message (`"type": "ping" | "cancel"`). Every outbound message carries the id it
//! answers and an RFC 3339 timestamp.

use crate::core::types::{ChatResponse, FinishReason, GatewayRequest, StreamSummary, Usage};
use crate::utils::error::{ErrorPayload, GatewayError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Ping { id: String },
    Cancel { id: String },
    Request(Box<GatewayRequest>),
}

/// An inbound frame that could not be understood. `id` is whatever id the frame carried, so
/// the error can still be correlated by the client.
#[derive(Debug)]
pub struct MalformedMessage {
    pub id: String,
    pub error: GatewayError,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl ClientMessage {
    pub fn parse(text: &str) -> std::result::Result<Self, MalformedMessage> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(|e| MalformedMessage {
            id: String::new(),
            error: GatewayError::bad_request(format!("Message is not valid JSON: {}", e)),
        })?;

        let envelope: Envelope =
            serde_json::from_value(value.clone()).map_err(|e| MalformedMessage {
                id: String::new(),
                error: GatewayError::bad_request(format!("Malformed message envelope: {}", e)),
            })?;
        let id = envelope.id.unwrap_or_default();

        match envelope.kind.as_deref() {
            Some("ping") => Ok(ClientMessage::Ping { id }),
            Some("cancel") if id.is_empty() => Err(MalformedMessage {
                id,
                error: GatewayError::bad_request("cancel requires the id of the request"),
            }),
            Some("cancel") => Ok(ClientMessage::Cancel { id }),
            Some(_) => serde_json::from_value::<GatewayRequest>(value)
                .map(|request| ClientMessage::Request(Box::new(request)))
                .map_err(|e| MalformedMessage {
                    id,
                    error: GatewayError::bad_request(format!("Invalid request: {}", e)),
                }),
            None => Err(MalformedMessage {
                id,
                error: GatewayError::bad_request("Message is missing a type"),
            }),
        }
    }
}

/// Outbound messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected {
        id: String,
        connection_id: String,
        timestamp: DateTime<Utc>,
    },
    /// Partial content; never carries usage
    Chunk {
        id: String,
        content: String,
        timestamp: DateTime<Utc>,
    },
    /// Terminal message of a streamed response
    Done {
        id: String,
        model: String,
        provider: String,
        finish_reason: FinishReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
        timestamp: DateTime<Utc>,
    },
    /// Terminal message of a non-streamed response
    Response {
        id: String,
        model: String,
        provider: String,
        content: String,
        finish_reason: FinishReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
        timestamp: DateTime<Utc>,
    },
    Error {
        id: String,
        error: ErrorPayload,
        timestamp: DateTime<Utc>,
    },
    Pong {
        id: String,
        timestamp: DateTime<Utc>,
    },
}

impl ServerMessage {
    pub fn connected(connection_id: &str) -> Self {
        ServerMessage::Connected {
            id: connection_id.to_string(),
            connection_id: connection_id.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn chunk(id: &str, content: impl Into<String>) -> Self {
        ServerMessage::Chunk {
            id: id.to_string(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn done(id: &str, provider: &str, summary: StreamSummary) -> Self {
        ServerMessage::Done {
            id: id.to_string(),
            model: summary.model,
            provider: provider.to_string(),
            finish_reason: summary.finish_reason,
            usage: summary.usage,
            timestamp: Utc::now(),
        }
    }

    pub fn response(id: &str, provider: &str, response: ChatResponse) -> Self {
        ServerMessage::Response {
            id: id.to_string(),
            model: response.model,
            provider: provider.to_string(),
            content: response.content,
            finish_reason: response.finish_reason,
            usage: response.usage,
            timestamp: Utc::now(),
        }
    }

    pub fn error(id: &str, error: &GatewayError) -> Self {
        ServerMessage::Error {
            id: id.to_string(),
            error: error.to_error_payload(),
            timestamp: Utc::now(),
        }
    }

    pub fn pong(id: &str) -> Self {
        ServerMessage::Pong {
            id: id.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ServerMessage::Connected { id, .. }
            | ServerMessage::Chunk { id, .. }
            | ServerMessage::Done { id, .. }
            | ServerMessage::Response { id, .. }
            | ServerMessage::Error { id, .. }
            | ServerMessage::Pong { id, .. } => id,
        }
    }

    /// Whether this message ends the exchange for its request id
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ServerMessage::Done { .. } | ServerMessage::Response { .. } | ServerMessage::Error { .. }
        )
    }

    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
