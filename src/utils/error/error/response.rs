//! Client-facing rendering of errors

use super::types::GatewayError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The `error` object carried by an outbound `error` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

/// Optional hints that let a client decide whether and when to try again
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<String>,
}

impl GatewayError {
    /// Message text safe to show a client. Internal failures collapse to a generic line.
    pub fn client_message(&self) -> String {
        match self {
            GatewayError::Config(_)
            | GatewayError::HttpClient(_)
            | GatewayError::Yaml(_)
            | GatewayError::Io(_)
            | GatewayError::Transport(_)
            | GatewayError::Internal(_) => "An internal error occurred".to_string(),
            GatewayError::Jwt(_) => "Invalid or expired token".to_string(),
            GatewayError::Serialization(_) => "Malformed request message".to_string(),
            GatewayError::Ledger(_) => "Billing service unavailable".to_string(),
            GatewayError::Authorization(reason) => reason.clone(),
            GatewayError::RateLimited { reason, .. } => reason.clone(),
            GatewayError::InsufficientCredits { reason, .. } => reason.clone(),
            GatewayError::Provider(e) => e.client_message(),
            GatewayError::AllProvidersUnavailable { .. } => {
                "All providers are currently unavailable".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Build the outbound `error` object for this failure
    pub fn to_error_payload(&self) -> ErrorPayload {
        let details = match self {
            GatewayError::RateLimited { reset_time, .. } => Some(ErrorDetails {
                retryable: true,
                reset_time: Some(*reset_time),
                ..Default::default()
            }),
            GatewayError::Provider(e) => Some(ErrorDetails {
                retryable: e.is_retryable(),
                retry_after_secs: e.retry_after(),
                ..Default::default()
            }),
            GatewayError::AllProvidersUnavailable { attempts } => Some(ErrorDetails {
                retryable: true,
                attempts: attempts
                    .iter()
                    .map(|a| format!("{}: {}", a.provider, a.error.client_code()))
                    .collect(),
                ..Default::default()
            }),
            GatewayError::Ledger(_) => Some(ErrorDetails {
                retryable: true,
                ..Default::default()
            }),
            _ => None,
        };

        ErrorPayload {
            code: self.client_code().to_string(),
            message: self.client_message(),
            details,
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Auth(_) | GatewayError::Jwt(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Authorization(_) => StatusCode::FORBIDDEN,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::InsufficientCredits { .. } => StatusCode::PAYMENT_REQUIRED,
            GatewayError::Validation(_)
            | GatewayError::BadRequest(_)
            | GatewayError::Serialization(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) | GatewayError::ProviderNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::Ledger(_)
            | GatewayError::Provider(_)
            | GatewayError::AllProvidersUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_error_payload(),
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }
}
