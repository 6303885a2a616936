//! In-memory repositories backed by `parking_lot` maps.
//!
//! Each trait method takes and releases the lock on its own, so two
//! calls from the same workflow are independent suspension points.
//! That matches the document-store semantics the reconciler is written
//! against: no cross-call atomicity, ever.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::model::{Cart, CartStatus, Complaint, Manager, Review};
use crate::domain::repo::{CartsRepository, ManagersRepository};

#[derive(Default)]
pub struct InMemoryCartsRepository {
    carts: RwLock<HashMap<String, Cart>>,
}

#[async_trait]
impl CartsRepository for InMemoryCartsRepository {
    async fn insert(&self, cart: Cart) -> anyhow::Result<()> {
        self.carts.write().insert(cart.cart_id.clone(), cart);
        Ok(())
    }

    async fn find_by_id(&self, cart_id: &str) -> anyhow::Result<Option<Cart>> {
        Ok(self.carts.read().get(cart_id).cloned())
    }

    async fn find_many(&self, cart_ids: &[String]) -> anyhow::Result<Vec<Cart>> {
        let carts = self.carts.read();
        let mut seen = HashSet::new();
        Ok(cart_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| carts.get(id).cloned())
            .collect())
    }

    async fn list(&self) -> anyhow::Result<Vec<Cart>> {
        let mut all: Vec<Cart> = self.carts.read().values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn update_fields(
        &self,
        cart_id: &str,
        status: Option<CartStatus>,
        location: Option<String>,
    ) -> anyhow::Result<Option<Cart>> {
        let mut carts = self.carts.write();
        let Some(cart) = carts.get_mut(cart_id) else {
            return Ok(None);
        };
        if let Some(status) = status {
            cart.status = status;
        }
        if let Some(location) = location {
            cart.location = location;
        }
        cart.updated_at = Utc::now();
        Ok(Some(cart.clone()))
    }

    async fn save(&self, cart: Cart) -> anyhow::Result<Option<Cart>> {
        let mut carts = self.carts.write();
        if !carts.contains_key(&cart.cart_id) {
            return Ok(None);
        }
        let mut cart = cart;
        cart.updated_at = Utc::now();
        carts.insert(cart.cart_id.clone(), cart.clone());
        Ok(Some(cart))
    }

    async fn delete(&self, cart_id: &str) -> anyhow::Result<bool> {
        Ok(self.carts.write().remove(cart_id).is_some())
    }

    async fn push_complaint(
        &self,
        cart_id: &str,
        complaint: Complaint,
    ) -> anyhow::Result<Option<Cart>> {
        let mut carts = self.carts.write();
        let Some(cart) = carts.get_mut(cart_id) else {
            return Ok(None);
        };
        cart.complaints.push(complaint);
        cart.updated_at = Utc::now();
        Ok(Some(cart.clone()))
    }

    async fn push_review(&self, cart_id: &str, review: Review) -> anyhow::Result<Option<Cart>> {
        let mut carts = self.carts.write();
        let Some(cart) = carts.get_mut(cart_id) else {
            return Ok(None);
        };
        cart.reviews.push(review);
        cart.updated_at = Utc::now();
        Ok(Some(cart.clone()))
    }

    async fn count_with_status(
        &self,
        cart_ids: &[String],
        status: CartStatus,
    ) -> anyhow::Result<usize> {
        let carts = self.carts.read();
        let distinct: HashSet<&str> = cart_ids.iter().map(String::as_str).collect();
        Ok(distinct
            .into_iter()
            .filter(|id| carts.get(*id).is_some_and(|c| c.status == status))
            .count())
    }

    async fn set_status_many(
        &self,
        cart_ids: &[String],
        status: CartStatus,
    ) -> anyhow::Result<usize> {
        let mut carts = self.carts.write();
        let now = Utc::now();
        let mut written = 0;
        let distinct: HashSet<&str> = cart_ids.iter().map(String::as_str).collect();
        for id in distinct {
            if let Some(cart) = carts.get_mut(id) {
                cart.status = status;
                cart.updated_at = now;
                written += 1;
            }
        }
        Ok(written)
    }
}

#[derive(Default)]
pub struct InMemoryManagersRepository {
    managers: RwLock<HashMap<Uuid, Manager>>,
}

#[async_trait]
impl ManagersRepository for InMemoryManagersRepository {
    async fn insert(&self, manager: Manager) -> anyhow::Result<()> {
        self.managers.write().insert(manager.id, manager);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Manager>> {
        Ok(self.managers.read().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Manager>> {
        Ok(self
            .managers
            .read()
            .values()
            .find(|m| m.email == email)
            .cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<Manager>> {
        let mut all: Vec<Manager> = self.managers.read().values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn save(&self, manager: Manager) -> anyhow::Result<Option<Manager>> {
        let mut managers = self.managers.write();
        if !managers.contains_key(&manager.id) {
            return Ok(None);
        }
        let mut manager = manager;
        manager.updated_at = Utc::now();
        managers.insert(manager.id, manager.clone());
        Ok(Some(manager))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.managers.write().remove(&id).is_some())
    }

    async fn email_in_use(&self, email: &str, exclude: Option<Uuid>) -> anyhow::Result<bool> {
        Ok(self
            .managers
            .read()
            .values()
            .any(|m| m.email == email && Some(m.id) != exclude))
    }

    async fn shop_id_in_use(&self, shop_id: &str, exclude: Option<Uuid>) -> anyhow::Result<bool> {
        Ok(self
            .managers
            .read()
            .values()
            .any(|m| m.shop.id == shop_id && Some(m.id) != exclude))
    }
}
