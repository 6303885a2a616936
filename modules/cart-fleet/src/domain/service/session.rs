//! Credential login. Hashing and verification are delegated to the
//! password hasher; token signing lives with the access gate, so this
//! module only resolves credentials to a caller.

use tracing::{info, instrument};

use super::Service;
use crate::auth::Caller;
use crate::domain::error::DomainError;
use crate::domain::model::Manager;

/// A successful login: the resolved caller, plus the manager record for
/// manager logins so the API can echo the profile.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub caller: Caller,
    pub manager: Option<Manager>,
}

impl Service {
    /// Resolve email + password to a caller. The bootstrap admin
    /// account is checked first, then the manager store. Both failure
    /// paths collapse into one indistinguishable message.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, DomainError> {
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::invalid_argument("Email and password required"));
        }
        let email = email.trim().to_lowercase();

        let admin = &self.config.admin;
        if email == admin.email && self.hasher.verify(password, &admin.password_hash) {
            info!("admin login");
            return Ok(LoginOutcome {
                caller: Caller::Admin { id: admin.id },
                manager: None,
            });
        }

        let manager = self
            .managers
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        let Some(manager) = manager else {
            return Err(DomainError::auth_failure("Invalid credentials"));
        };
        if !self.hasher.verify(password, &manager.password_hash) {
            return Err(DomainError::auth_failure("Invalid credentials"));
        }

        info!(manager_id = %manager.id, "manager login");
        Ok(LoginOutcome {
            caller: Caller::Manager {
                id: manager.id,
                shop_id: manager.shop.id.clone(),
            },
            manager: Some(manager),
        })
    }
}
