//! Authentication configuration validators
//!
//! AuthConfig and RolesConfig.

use super::trait_def::Validate;
use crate::config::models::*;
use std::collections::HashSet;
use tracing::debug;

const MIN_SECRET_LEN: usize = 32;

impl Validate for AuthConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating auth configuration");

        if self.jwt_secret.is_empty() {
            return Err("JWT secret cannot be empty".to_string());
        }

        if self.jwt_secret == "change-me-in-production" {
            return Err("JWT secret must be changed from the default value".to_string());
        }

        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(format!(
                "JWT secret should be at least {} characters long",
                MIN_SECRET_LEN
            ));
        }

        Ok(())
    }
}

impl Validate for RolesConfig {
    fn validate(&self) -> Result<(), String> {
        if self.default_role.is_empty() {
            return Err("Default role cannot be empty".to_string());
        }

        if self.capabilities.is_empty() {
            return Ok(());
        }

        let mut names = HashSet::new();
        for capability in &self.capabilities {
            if !names.insert(capability.name.as_str()) {
                return Err(format!("Duplicate role: {}", capability.name));
            }
        }

        if !names.contains(self.default_role.as_str()) {
            return Err(format!(
                "Default role '{}' is not defined in roles.capabilities",
                self.default_role
            ));
        }

        Ok(())
    }
}
