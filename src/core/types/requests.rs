//! Normalized request types

use super::message::ChatMessage;
use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};

/// Kind of call the client wants; doubles as the authorization feature name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Chat,
    Completion,
}

impl RequestType {
    pub fn feature(&self) -> &'static str {
        match self {
            RequestType::Chat => "chat",
            RequestType::Completion => "completion",
        }
    }
}

/// `provider` field: absent or `"auto"` selects primary with fallback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ProviderSelection {
    #[default]
    Auto,
    Named(String),
}

impl From<Option<String>> for ProviderSelection {
    fn from(value: Option<String>) -> Self {
        match value {
            None => ProviderSelection::Auto,
            Some(name) if name.is_empty() || name.eq_ignore_ascii_case("auto") => {
                ProviderSelection::Auto
            }
            Some(name) => ProviderSelection::Named(name),
        }
    }
}

impl From<ProviderSelection> for Option<String> {
    fn from(value: ProviderSelection) -> Self {
        match value {
            ProviderSelection::Auto => Some("auto".to_string()),
            ProviderSelection::Named(name) => Some(name),
        }
    }
}

/// Optional sampling parameters, passed through to the backend when set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

/// Normalized request. Immutable once handed to the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    #[serde(default)]
    pub provider: ProviderSelection,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
    #[serde(flatten)]
    pub params: SamplingParams,
}

impl GatewayRequest {
    /// Shape checks that do not depend on the caller's role
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(GatewayError::validation("Request id cannot be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(GatewayError::validation("Model cannot be empty"));
        }
        if self.messages.is_empty() {
            return Err(GatewayError::validation("At least one message is required"));
        }

        let p = &self.params;
        if p.max_tokens == Some(0) {
            return Err(GatewayError::validation("max_tokens must be greater than 0"));
        }
        if let Some(t) = p.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(GatewayError::validation(
                    "temperature must be between 0 and 2",
                ));
            }
        }
        if let Some(top_p) = p.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(GatewayError::validation("top_p must be between 0 and 1"));
            }
        }
        for (name, value) in [
            ("frequency_penalty", p.frequency_penalty),
            ("presence_penalty", p.presence_penalty),
        ] {
            if let Some(v) = value {
                if !(-2.0..=2.0).contains(&v) {
                    return Err(GatewayError::validation(format!(
                        "{} must be between -2 and 2",
                        name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Concatenated message text, used by the token estimator
    pub fn prompt_text_len(&self) -> usize {
        self.messages.iter().map(|m| m.content.chars().count()).sum()
    }
}
