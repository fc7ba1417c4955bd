//! Token revocation list
//!
//! The identity service owns revocation; the gateway only asks whether a token id is revoked.

use crate::utils::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;

#[async_trait]
pub trait RevocationList: Send + Sync {
    /// `Err` means the answer is unknown; callers treat that as revoked
    async fn is_revoked(&self, token_id: &str) -> Result<bool>;
}

/// Process-local list, seeded from configuration
#[derive(Debug, Default)]
pub struct InMemoryRevocationList {
    revoked: RwLock<HashSet<String>>,
}

impl InMemoryRevocationList {
    pub fn new<I, S>(token_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            revoked: RwLock::new(token_ids.into_iter().map(Into::into).collect()),
        }
    }

    pub fn revoke(&self, token_id: impl Into<String>) {
        self.revoked.write().insert(token_id.into());
    }

    pub fn len(&self) -> usize {
        self.revoked.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.read().is_empty()
    }
}

#[async_trait]
impl RevocationList for InMemoryRevocationList {
    async fn is_revoked(&self, token_id: &str) -> Result<bool> {
        Ok(self.revoked.read().contains(token_id))
    }
}
