//! External ledger collaborator
//!
//! The gateway never owns balances. It reads them before a request and posts a debit after
//! the response is delivered; both calls may be slow or fail.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LedgerConfig;
use crate::utils::error::{GatewayError, Result};

/// Balance lookup and debit
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Current balance of `user_id`
    async fn balance(&self, user_id: &str) -> Result<f64>;

    /// Deduct `amount`; returns the new balance
    async fn debit(&self, user_id: &str, amount: f64, description: &str) -> Result<f64>;
}

#[derive(Debug, Deserialize)]
struct BalanceBody {
    #[serde(alias = "new_balance")]
    balance: f64,
}

#[derive(Debug, Serialize)]
struct DebitBody<'a> {
    user_id: &'a str,
    amount: f64,
    description: &'a str,
}

/// Ledger over HTTP: `GET {base}/balances/{user}` and `POST {base}/debits`
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    client: Client,
    base_url: String,
    service_token: Option<String>,
}

impl HttpLedgerClient {
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GatewayError::ledger(format!("Failed to create ledger client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_token: config
                .service_token
                .clone()
                .filter(|token| !token.is_empty()),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.service_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_balance(response: reqwest::Response, action: &str) -> Result<f64> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::ledger(format!(
                "Ledger {} failed with status {}: {}",
                action,
                status.as_u16(),
                body.trim()
            )));
        }
        let body: BalanceBody = response
            .json()
            .await
            .map_err(|e| GatewayError::ledger(format!("Invalid ledger {} response: {}", action, e)))?;
        Ok(body.balance)
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn balance(&self, user_id: &str) -> Result<f64> {
        let user: String = url::form_urlencoded::byte_serialize(user_id.as_bytes()).collect();
        let url = format!("{}/balances/{}", self.base_url, user);
        debug!(user_id, "Fetching ledger balance");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| GatewayError::ledger(format!("Ledger balance request failed: {}", e)))?;
        Self::read_balance(response, "balance lookup").await
    }

    async fn debit(&self, user_id: &str, amount: f64, description: &str) -> Result<f64> {
        let url = format!("{}/debits", self.base_url);
        debug!(user_id, amount, "Posting ledger debit");

        let response = self
            .authorize(self.client.post(&url))
            .json(&DebitBody {
                user_id,
                amount,
                description,
            })
            .send()
            .await
            .map_err(|e| GatewayError::ledger(format!("Ledger debit request failed: {}", e)))?;
        Self::read_balance(response, "debit").await
    }
}
