//! Usage record

use crate::core::types::Usage;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One completed (or failed) request, as reported to the audit sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    pub user_id: String,
    pub connection_id: String,
    pub request_id: String,
    /// Provider that served the request; `None` when it never reached one
    pub provider: Option<String>,
    pub model: String,
    pub usage: Option<Usage>,
    pub credits: f64,
    pub duration_ms: u64,
    pub success: bool,
    /// Client-facing error code on failure
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}
