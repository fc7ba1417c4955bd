//! Authentication and authorization
//!
//! Connections authenticate once, at upgrade time, with a bearer JWT. Each request on an
//! authenticated connection is then checked against the role capability matrix.

pub mod credential;
pub mod jwt;
pub mod rbac;
pub mod revocation;
pub mod user;

pub use credential::{CredentialSource, ExtractedCredential, extract_credential, select_protocol};
pub use jwt::{Claims, JwtVerifier};
pub use rbac::{
    AuthorizationDecision, CapabilityMatrix, RateLimitDecision, RateLimitSpec, RoleCapability,
    UsageSnapshot,
};
pub use revocation::{InMemoryRevocationList, RevocationList};
pub use user::AuthenticatedUser;

use crate::utils::error::{GatewayError, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Verifies a connection credential: signature and expiry, then revocation
#[derive(Clone)]
pub struct ConnectionAuthenticator {
    verifier: JwtVerifier,
    revocations: Arc<dyn RevocationList>,
}

impl ConnectionAuthenticator {
    pub fn new(verifier: JwtVerifier, revocations: Arc<dyn RevocationList>) -> Self {
        Self {
            verifier,
            revocations,
        }
    }

    /// Any failure, including an unreachable revocation list, rejects the connection
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.verifier.verify_token(token)?;

        match self.revocations.is_revoked(&claims.jti).await {
            Ok(false) => {}
            Ok(true) => {
                warn!(user_id = %claims.sub, token_id = %claims.jti, "Revoked token presented");
                return Err(GatewayError::auth("Token has been revoked"));
            }
            Err(e) => {
                warn!(user_id = %claims.sub, error = %e, "Revocation check failed");
                return Err(GatewayError::auth(
                    "Unable to verify token revocation status",
                ));
            }
        }

        debug!(user_id = %claims.sub, role = %claims.role, "Connection authenticated");
        Ok(AuthenticatedUser::from(claims))
    }
}
