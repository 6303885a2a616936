//! Shared fixtures for unit and integration tests.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::{AdminAccount, PasswordHasher};
use crate::domain::model::{Manager, NewManager, NewShop, Shop};
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::password::BcryptPasswordHasher;
use crate::infra::storage::memory::{InMemoryCartsRepository, InMemoryManagersRepository};

pub const TEST_ADMIN_EMAIL: &str = "admin@smartcart.test";
pub const TEST_ADMIN_PASSWORD: &str = "admin123";
pub const TEST_MANAGER_PASSWORD: &str = "secret123";

/// A service wired to fresh in-memory stores, with handles to both
/// stores so tests can inspect state behind the service's back.
pub fn service_with_memory_repos() -> (
    Service,
    Arc<InMemoryCartsRepository>,
    Arc<InMemoryManagersRepository>,
) {
    let carts = Arc::new(InMemoryCartsRepository::default());
    let managers = Arc::new(InMemoryManagersRepository::default());
    let (service, _) = service_with_repos(Arc::clone(&carts), Arc::clone(&managers));
    (service, carts, managers)
}

/// Same wiring, also exposing the hasher for auth-layer tests.
pub fn service_with_repos(
    carts: Arc<InMemoryCartsRepository>,
    managers: Arc<InMemoryManagersRepository>,
) -> (Service, Arc<dyn PasswordHasher>) {
    // MIN_COST keeps the bcrypt work factor out of test runtime.
    let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptPasswordHasher::new(4));
    let admin_hash = hasher
        .hash(TEST_ADMIN_PASSWORD)
        .unwrap_or_else(|e| panic!("bcrypt failed: {e}"));
    let config = ServiceConfig {
        min_password_len: 6,
        admin: AdminAccount {
            id: Uuid::new_v4(),
            email: TEST_ADMIN_EMAIL.to_owned(),
            password_hash: admin_hash,
        },
    };
    let service = Service::new(carts, managers, Arc::clone(&hasher), config);
    (service, hasher)
}

/// Input for `Service::create_manager` with every required field set.
pub fn new_manager_input(email: &str, shop_id: &str, cart_ids: &[&str]) -> NewManager {
    NewManager {
        manager_name: Some("Test Manager".to_owned()),
        email: Some(email.to_owned()),
        password: Some(TEST_MANAGER_PASSWORD.to_owned()),
        shop: Some(NewShop {
            name: Some("Test Shop".to_owned()),
            id: Some(shop_id.to_owned()),
            address: Some("1 Test St".to_owned()),
            phone: Some("555-0100".to_owned()),
        }),
        assigned_carts: cart_ids.iter().map(|&id| id.to_owned()).collect(),
    }
}

/// A fully-formed manager record for direct repository insertion.
pub fn test_manager(email: &str, shop_id: &str) -> Manager {
    let now = Utc::now();
    Manager {
        id: Uuid::new_v4(),
        manager_name: "Test Manager".to_owned(),
        email: email.to_owned(),
        password_hash: "unused".to_owned(),
        shop: Shop {
            name: "Test Shop".to_owned(),
            id: shop_id.to_owned(),
            address: "1 Test St".to_owned(),
            phone: "555-0100".to_owned(),
        },
        assigned_carts: Vec::new(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
