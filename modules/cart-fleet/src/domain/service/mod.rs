//! Domain service layer.
//!
//! One `Service` aggregates both stores behind their repository
//! contracts, with per-resource submodules:
//! - `carts` - cart CRUD and the complaint/review sub-resource lifecycle
//! - `managers` - manager CRUD, delegating assignment changes to the
//!   reconciler before committing the manager document
//! - `session` - credential login, delegated to the password hasher
//! - `reconciler` - the cart-manager assignment consistency engine
//!
//! The API layer depends on this module, never the other way around.

use std::sync::Arc;

use crate::auth::{AdminAccount, PasswordHasher};
use crate::domain::repo::{CartsRepository, ManagersRepository};

mod carts;
mod managers;
mod reconciler;
mod session;

pub use reconciler::{ReconcilePlan, Reconciler};
pub use session::LoginOutcome;

/// Configuration for the domain service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub min_password_len: usize,
    /// Bootstrap administrative principal, seeded from configuration.
    pub admin: AdminAccount,
}

#[derive(Clone)]
pub struct Service {
    carts: Arc<dyn CartsRepository>,
    managers: Arc<dyn ManagersRepository>,
    hasher: Arc<dyn PasswordHasher>,
    reconciler: Reconciler,
    config: ServiceConfig,
}

impl Service {
    pub fn new(
        carts: Arc<dyn CartsRepository>,
        managers: Arc<dyn ManagersRepository>,
        hasher: Arc<dyn PasswordHasher>,
        config: ServiceConfig,
    ) -> Self {
        let reconciler = Reconciler::new(Arc::clone(&carts));
        Self {
            carts,
            managers,
            hasher,
            reconciler,
            config,
        }
    }

    /// The reconciler bound to this service's cart store.
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }
}
