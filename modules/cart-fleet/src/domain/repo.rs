//! Repository contracts over the two entity collections.
//!
//! These are the document-store primitives the engine assumes:
//! find-by-id, find-by-field, update-by-filter, delete-by-filter and
//! count-by-filter. No cross-collection atomicity is provided or
//! assumed; every call is an independent suspension point.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::model::{Cart, CartStatus, Complaint, Manager, Review};

#[async_trait]
pub trait CartsRepository: Send + Sync {
    async fn insert(&self, cart: Cart) -> anyhow::Result<()>;

    async fn find_by_id(&self, cart_id: &str) -> anyhow::Result<Option<Cart>>;

    /// Fetch the distinct carts whose ids appear in `cart_ids`;
    /// missing ids are silently skipped.
    async fn find_many(&self, cart_ids: &[String]) -> anyhow::Result<Vec<Cart>>;

    async fn list(&self) -> anyhow::Result<Vec<Cart>>;

    /// Apply a field-level update; `None` when the cart does not exist.
    async fn update_fields(
        &self,
        cart_id: &str,
        status: Option<CartStatus>,
        location: Option<String>,
    ) -> anyhow::Result<Option<Cart>>;

    /// Replace the stored document wholesale (used for embedded
    /// sub-resource mutation); `None` when the cart does not exist.
    async fn save(&self, cart: Cart) -> anyhow::Result<Option<Cart>>;

    async fn delete(&self, cart_id: &str) -> anyhow::Result<bool>;

    async fn push_complaint(
        &self,
        cart_id: &str,
        complaint: Complaint,
    ) -> anyhow::Result<Option<Cart>>;

    async fn push_review(&self, cart_id: &str, review: Review) -> anyhow::Result<Option<Cart>>;

    /// Count the distinct stored carts among `cart_ids` currently in
    /// `status`. Duplicate ids in the input match a single document,
    /// which is what makes the reconciler's count check conservative.
    async fn count_with_status(
        &self,
        cart_ids: &[String],
        status: CartStatus,
    ) -> anyhow::Result<usize>;

    /// Set `status` on every stored cart whose id appears in
    /// `cart_ids`; returns the number of carts written.
    async fn set_status_many(
        &self,
        cart_ids: &[String],
        status: CartStatus,
    ) -> anyhow::Result<usize>;
}

#[async_trait]
pub trait ManagersRepository: Send + Sync {
    async fn insert(&self, manager: Manager) -> anyhow::Result<()>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Manager>>;

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Manager>>;

    /// All managers, newest first.
    async fn list(&self) -> anyhow::Result<Vec<Manager>>;

    /// Replace the stored document; `None` when the manager does not
    /// exist.
    async fn save(&self, manager: Manager) -> anyhow::Result<Option<Manager>>;

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Email uniqueness probe; `exclude` skips the record being
    /// updated.
    async fn email_in_use(&self, email: &str, exclude: Option<Uuid>) -> anyhow::Result<bool>;

    /// Shop-id uniqueness probe across the embedded shop descriptors.
    async fn shop_id_in_use(&self, shop_id: &str, exclude: Option<Uuid>) -> anyhow::Result<bool>;
}
