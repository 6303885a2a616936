//! Assignment reconciler: the only writer of cart status on behalf of
//! manager mutations.
//!
//! The reconciler keeps two independently stored facts consistent: a
//! cart's `status` and the manager's `assigned_carts` list. It holds no
//! state of its own and re-reads the cart store on every call, which
//! narrows but does not close the validate-then-write race window: two
//! concurrent claims of the same available cart can both pass
//! validation, and the last status write wins. There is no compensating
//! rollback; a failure after some status writes have been issued leaves
//! those writes in place and only aborts the manager-side commit.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::error::DomainError;
use crate::domain::model::CartStatus;
use crate::domain::repo::CartsRepository;

/// Minimal set of status transitions needed to move a manager's
/// assignment list from `previous` to `desired`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Carts released back to `Available` (previous \ desired).
    pub to_release: Vec<String>,
    /// Carts claimed as `InUse` (desired \ previous).
    pub to_claim: Vec<String>,
}

impl ReconcilePlan {
    /// Set difference in both directions, ignoring order and duplicates
    /// while preserving first-occurrence order in the output. Carts in
    /// both lists appear in neither set: self-reassignment is never
    /// blocked because it never reaches validation.
    pub fn diff(previous: &[String], desired: &[String]) -> Self {
        let prev: HashSet<&str> = previous.iter().map(String::as_str).collect();
        let next: HashSet<&str> = desired.iter().map(String::as_str).collect();

        let mut seen = HashSet::new();
        let to_release = previous
            .iter()
            .filter(|id| !next.contains(id.as_str()) && seen.insert(id.as_str()))
            .cloned()
            .collect();

        seen.clear();
        let to_claim = desired
            .iter()
            .filter(|id| !prev.contains(id.as_str()) && seen.insert(id.as_str()))
            .cloned()
            .collect();

        Self {
            to_release,
            to_claim,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_release.is_empty() && self.to_claim.is_empty()
    }
}

/// Coordinating service over the cart store. See the module docs for
/// the consistency model.
#[derive(Clone)]
pub struct Reconciler {
    carts: Arc<dyn CartsRepository>,
}

impl Reconciler {
    pub fn new(carts: Arc<dyn CartsRepository>) -> Self {
        Self { carts }
    }

    /// Check that every cart in `cart_ids` is currently `Available`.
    ///
    /// The check is a count comparison: distinct available documents
    /// versus requested list length. Duplicates in the input are not
    /// deduplicated first, so a duplicated id can never satisfy the
    /// count and fails validation. That conservatism is intentional.
    pub async fn validate_claimable(&self, cart_ids: &[String]) -> Result<(), DomainError> {
        let available = self
            .carts
            .count_with_status(cart_ids, CartStatus::Available)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        if available == cart_ids.len() {
            return Ok(());
        }

        let unavailable = self.unavailable_subset(cart_ids).await?;
        debug!(?unavailable, "cart claim validation failed");
        Err(DomainError::invalid_argument(format!(
            "One or more carts are not available: {}",
            unavailable.join(", ")
        )))
    }

    /// Mark every cart in the validated set as `InUse`. Used on manager
    /// creation, after the manager document is committed.
    pub async fn claim(&self, cart_ids: &[String]) -> Result<(), DomainError> {
        if cart_ids.is_empty() {
            return Ok(());
        }
        let claimed = self
            .carts
            .set_status_many(cart_ids, CartStatus::InUse)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(claimed, "claimed carts");
        Ok(())
    }

    /// Diff-and-apply: validate the carts newly claimed, then apply
    /// releases before claims. The ordering matters when one logical
    /// operation both frees a cart and hands it to another owner.
    ///
    /// Validation happens before any write, so a validation failure has
    /// no side effects. A storage failure between the release and claim
    /// writes leaves the released carts released; the caller must not
    /// commit the manager document in that case.
    pub async fn reconcile(
        &self,
        previous: &[String],
        desired: &[String],
    ) -> Result<ReconcilePlan, DomainError> {
        let plan = ReconcilePlan::diff(previous, desired);
        if plan.is_empty() {
            return Ok(plan);
        }

        if !plan.to_claim.is_empty() {
            self.validate_claimable(&plan.to_claim).await?;
        }

        if !plan.to_release.is_empty() {
            self.carts
                .set_status_many(&plan.to_release, CartStatus::Available)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?;
        }
        if !plan.to_claim.is_empty() {
            self.carts
                .set_status_many(&plan.to_claim, CartStatus::InUse)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?;
        }

        info!(
            released = plan.to_release.len(),
            claimed = plan.to_claim.len(),
            "reconciled cart assignments"
        );
        Ok(plan)
    }

    /// Release every cart in `cart_ids` back to `Available`. Idempotent:
    /// already-available carts are simply re-set.
    pub async fn release_all(&self, cart_ids: &[String]) -> Result<(), DomainError> {
        if cart_ids.is_empty() {
            return Ok(());
        }
        let released = self
            .carts
            .set_status_many(cart_ids, CartStatus::Available)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(released, "released carts");
        Ok(())
    }

    /// First-occurrence list of ids that cannot be claimed: missing
    /// carts, carts not currently available, and repeated occurrences
    /// of an id already consumed by the count.
    async fn unavailable_subset(&self, cart_ids: &[String]) -> Result<Vec<String>, DomainError> {
        let found = self
            .carts
            .find_many(cart_ids)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        let available: HashSet<&str> = found
            .iter()
            .filter(|c| c.status == CartStatus::Available)
            .map(|c| c.cart_id.as_str())
            .collect();

        let mut consumed = HashSet::new();
        let unavailable = cart_ids
            .iter()
            .filter(|id| !available.contains(id.as_str()) || !consumed.insert(id.as_str()))
            .cloned()
            .collect();
        Ok(unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Cart;
    use crate::infra::storage::memory::InMemoryCartsRepository;
    use chrono::Utc;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    async fn repo_with(carts: &[(&str, CartStatus)]) -> Arc<InMemoryCartsRepository> {
        let repo = Arc::new(InMemoryCartsRepository::default());
        for (id, status) in carts {
            let mut cart = Cart::new((*id).to_owned(), Utc::now());
            cart.status = *status;
            repo.insert(cart).await.unwrap();
        }
        repo
    }

    #[test]
    fn diff_ignores_order_and_duplicates() {
        let plan = ReconcilePlan::diff(
            &ids(&["C1", "C2", "C2"]),
            &ids(&["C3", "C2", "C3", "C1", "C4"]),
        );
        assert_eq!(plan.to_release, Vec::<String>::new());
        assert_eq!(plan.to_claim, ids(&["C3", "C4"]));

        let plan = ReconcilePlan::diff(&ids(&["C1", "C2"]), &ids(&["C2", "C3"]));
        assert_eq!(plan.to_release, ids(&["C1"]));
        assert_eq!(plan.to_claim, ids(&["C3"]));
    }

    #[test]
    fn diff_of_identical_lists_is_empty() {
        let plan = ReconcilePlan::diff(&ids(&["C1", "C2"]), &ids(&["C2", "C1"]));
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn validate_claimable_accepts_all_available() {
        let repo = repo_with(&[
            ("C1", CartStatus::Available),
            ("C2", CartStatus::Available),
        ])
        .await;
        let reconciler = Reconciler::new(repo);
        reconciler
            .validate_claimable(&ids(&["C1", "C2"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn validate_claimable_lists_unavailable_subset() {
        let repo = repo_with(&[
            ("C1", CartStatus::Available),
            ("C2", CartStatus::InUse),
            ("C3", CartStatus::Maintenance),
        ])
        .await;
        let reconciler = Reconciler::new(repo);

        let err = reconciler
            .validate_claimable(&ids(&["C1", "C2", "C3", "C9"]))
            .await
            .unwrap_err();
        match err {
            DomainError::InvalidArgument { message } => {
                assert!(message.contains("C2"), "{message}");
                assert!(message.contains("C3"), "{message}");
                assert!(message.contains("C9"), "{message}");
                assert!(!message.contains("C1"), "{message}");
            }
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn validate_claimable_is_conservative_about_duplicates() {
        let repo = repo_with(&[("C1", CartStatus::Available)]).await;
        let reconciler = Reconciler::new(repo);

        // One available document cannot satisfy two requested slots.
        let err = reconciler
            .validate_claimable(&ids(&["C1", "C1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn reconcile_releases_before_claims() {
        let repo = repo_with(&[
            ("C1", CartStatus::InUse),
            ("C2", CartStatus::InUse),
            ("C3", CartStatus::Available),
        ])
        .await;
        let reconciler = Reconciler::new(Arc::clone(&repo) as Arc<dyn CartsRepository>);

        let plan = reconciler
            .reconcile(&ids(&["C1", "C2"]), &ids(&["C2", "C3"]))
            .await
            .unwrap();
        assert_eq!(plan.to_release, ids(&["C1"]));
        assert_eq!(plan.to_claim, ids(&["C3"]));

        let c1 = repo.find_by_id("C1").await.unwrap().unwrap();
        let c2 = repo.find_by_id("C2").await.unwrap().unwrap();
        let c3 = repo.find_by_id("C3").await.unwrap().unwrap();
        assert_eq!(c1.status, CartStatus::Available);
        assert_eq!(c2.status, CartStatus::InUse);
        assert_eq!(c3.status, CartStatus::InUse);
    }

    #[tokio::test]
    async fn reconcile_never_blocks_self_reassignment() {
        // C1 is InUse (held by the caller); keeping it must not fail
        // validation even though it is not Available.
        let repo = repo_with(&[
            ("C1", CartStatus::InUse),
            ("C2", CartStatus::Available),
        ])
        .await;
        let reconciler = Reconciler::new(repo);

        reconciler
            .reconcile(&ids(&["C1"]), &ids(&["C1", "C2"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reconcile_validation_failure_has_no_side_effects() {
        let repo = repo_with(&[
            ("C1", CartStatus::InUse),
            ("C2", CartStatus::Maintenance),
        ])
        .await;
        let reconciler = Reconciler::new(Arc::clone(&repo) as Arc<dyn CartsRepository>);

        let err = reconciler
            .reconcile(&ids(&["C1"]), &ids(&["C2"]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));

        // C1 was not released, C2 untouched.
        let c1 = repo.find_by_id("C1").await.unwrap().unwrap();
        let c2 = repo.find_by_id("C2").await.unwrap().unwrap();
        assert_eq!(c1.status, CartStatus::InUse);
        assert_eq!(c2.status, CartStatus::Maintenance);
    }

    #[tokio::test]
    async fn release_all_is_idempotent() {
        let repo = repo_with(&[
            ("C1", CartStatus::InUse),
            ("C2", CartStatus::InUse),
        ])
        .await;
        let reconciler = Reconciler::new(Arc::clone(&repo) as Arc<dyn CartsRepository>);

        reconciler.release_all(&ids(&["C1", "C2"])).await.unwrap();
        reconciler.release_all(&ids(&["C1", "C2"])).await.unwrap();

        for id in ["C1", "C2"] {
            let cart = repo.find_by_id(id).await.unwrap().unwrap();
            assert_eq!(cart.status, CartStatus::Available);
        }
    }
}
