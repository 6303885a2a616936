//! Wires configuration into a ready-to-serve application state:
//! stores, password hasher, bootstrap admin, JWT gate and the domain
//! service.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use uuid::Uuid;

use crate::api::rest::AppState;
use crate::auth::jwt::JwtAccessGate;
use crate::auth::{AccessGate, AdminAccount, PasswordHasher, TokenIssuer};
use crate::config::CartFleetConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::password::BcryptPasswordHasher;
use crate::infra::storage::memory::{InMemoryCartsRepository, InMemoryManagersRepository};

pub fn build_state(config: &CartFleetConfig) -> anyhow::Result<AppState> {
    let carts = Arc::new(InMemoryCartsRepository::default());
    let managers = Arc::new(InMemoryManagersRepository::default());
    let hasher: Arc<dyn PasswordHasher> =
        Arc::new(BcryptPasswordHasher::new(config.auth.bcrypt_cost));

    let admin = AdminAccount {
        id: Uuid::new_v4(),
        email: config.auth.admin_email.trim().to_lowercase(),
        password_hash: hasher
            .hash(&config.auth.admin_password)
            .context("hashing bootstrap admin password")?,
    };
    info!(email = %admin.email, "bootstrap admin account ready");

    let service = Service::new(
        carts,
        Arc::clone(&managers) as _,
        Arc::clone(&hasher),
        ServiceConfig {
            min_password_len: config.auth.min_password_len,
            admin: admin.clone(),
        },
    );

    let gate = Arc::new(JwtAccessGate::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl(),
        managers,
        admin,
    ));

    Ok(AppState {
        service: Arc::new(service),
        gate: Arc::clone(&gate) as Arc<dyn AccessGate>,
        issuer: gate as Arc<dyn TokenIssuer>,
    })
}
