//! Manager store operations. Every mutation that touches
//! `assigned_carts` goes through the reconciler before the manager
//! document is committed; the two stores have no shared transaction, so
//! ordering is the only consistency tool available here.

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::Service;
use crate::domain::error::DomainError;
use crate::domain::model::{
    CartSummary, Manager, ManagerDetail, ManagerPatch, NewManager, NewShop, Shop,
};

impl Service {
    /// Create a manager and claim its requested carts.
    ///
    /// Availability is validated before any write. The manager document
    /// is committed first and the claim applied after, mirroring the
    /// original commit order; a claim failure therefore leaves a
    /// committed manager whose carts were not all marked `InUse`. That
    /// partial-failure mode is surfaced, not rolled back.
    #[instrument(skip(self, new))]
    pub async fn create_manager(&self, new: NewManager) -> Result<Manager, DomainError> {
        let (manager_name, email, password, shop) = validate_new_manager(&new)?;
        self.validate_password(&password)?;

        if self
            .managers
            .email_in_use(&email, None)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::conflict(
                "Manager with that email already exists",
            ));
        }
        if self
            .managers
            .shop_id_in_use(&shop.id, None)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::conflict("Shop ID already exists"));
        }

        if !new.assigned_carts.is_empty() {
            self.reconciler
                .validate_claimable(&new.assigned_carts)
                .await?;
        }

        let password_hash = self
            .hasher
            .hash(&password)
            .map_err(|e| DomainError::database(e.to_string()))?;

        let now = Utc::now();
        let manager = Manager {
            id: Uuid::new_v4(),
            manager_name,
            email,
            password_hash,
            shop,
            assigned_carts: new.assigned_carts.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.managers
            .insert(manager.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        if !manager.assigned_carts.is_empty() {
            if let Err(e) = self.reconciler.claim(&manager.assigned_carts).await {
                warn!(manager_id = %manager.id, error = %e, "claim after manager commit failed");
                return Err(e);
            }
        }

        info!(manager_id = %manager.id, "manager created");
        Ok(manager)
    }

    pub async fn get_manager(&self, id: Uuid) -> Result<ManagerDetail, DomainError> {
        let manager = self
            .managers
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::manager_not_found(id))?;
        let carts = self.expand_assigned_carts(&manager).await?;
        Ok(ManagerDetail { manager, carts })
    }

    pub async fn get_manager_by_email(&self, email: &str) -> Result<Manager, DomainError> {
        let email = email.trim().to_lowercase();
        self.managers
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::manager_not_found_by_email(&email))
    }

    /// All managers, newest first, each assignment list expanded into
    /// cart summaries.
    pub async fn list_managers(&self) -> Result<Vec<ManagerDetail>, DomainError> {
        let managers = self
            .managers
            .list()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let mut details = Vec::with_capacity(managers.len());
        for manager in managers {
            let carts = self.expand_assigned_carts(&manager).await?;
            details.push(ManagerDetail { manager, carts });
        }
        Ok(details)
    }

    /// Partial manager update. When `assigned_carts` is present the
    /// reconciler runs first with the stored list as baseline, and the
    /// manager document is only saved once reconciliation has applied
    /// its releases and claims.
    #[instrument(skip(self, patch))]
    pub async fn update_manager(
        &self,
        id: Uuid,
        patch: ManagerPatch,
    ) -> Result<Manager, DomainError> {
        let previous = self
            .managers
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::manager_not_found(id))?;

        let email = match patch.email {
            Some(raw) => {
                let email = raw.trim().to_lowercase();
                if email.is_empty() {
                    return Err(DomainError::invalid_argument("Email cannot be empty"));
                }
                if self
                    .managers
                    .email_in_use(&email, Some(id))
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?
                {
                    return Err(DomainError::conflict(
                        "Manager with that email already exists",
                    ));
                }
                Some(email)
            }
            None => None,
        };

        let shop = match &patch.shop {
            Some(shop_patch) => {
                if let Some(shop_id) = shop_patch.id.as_deref() {
                    if self
                        .managers
                        .shop_id_in_use(shop_id, Some(id))
                        .await
                        .map_err(|e| DomainError::database(e.to_string()))?
                    {
                        return Err(DomainError::conflict("Shop ID already exists"));
                    }
                }
                Some(merge_shop(&previous.shop, shop_patch))
            }
            None => None,
        };

        let password_hash = match patch.password {
            Some(password) => {
                self.validate_password(&password)?;
                Some(
                    self.hasher
                        .hash(&password)
                        .map_err(|e| DomainError::database(e.to_string()))?,
                )
            }
            None => None,
        };

        if let Some(desired) = &patch.assigned_carts {
            self.reconciler
                .reconcile(&previous.assigned_carts, desired)
                .await?;
        }

        let mut manager = previous;
        if let Some(name) = patch.manager_name {
            manager.manager_name = name;
        }
        if let Some(email) = email {
            manager.email = email;
        }
        if let Some(shop) = shop {
            manager.shop = shop;
        }
        if let Some(hash) = password_hash {
            manager.password_hash = hash;
        }
        if let Some(desired) = patch.assigned_carts {
            manager.assigned_carts = desired;
        }
        manager.updated_at = Utc::now();

        let saved = self
            .managers
            .save(manager)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::manager_not_found(id))?;
        info!(manager_id = %id, "manager updated");
        Ok(saved)
    }

    /// Delete a manager, releasing every assigned cart back to
    /// `Available` before the record is removed.
    #[instrument(skip(self))]
    pub async fn delete_manager(&self, id: Uuid) -> Result<(), DomainError> {
        let manager = self
            .managers
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::manager_not_found(id))?;

        self.reconciler.release_all(&manager.assigned_carts).await?;

        self.managers
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(manager_id = %id, "manager deleted");
        Ok(())
    }

    async fn expand_assigned_carts(
        &self,
        manager: &Manager,
    ) -> Result<Vec<CartSummary>, DomainError> {
        let carts = self
            .carts
            .find_many(&manager.assigned_carts)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(carts.iter().map(CartSummary::from).collect())
    }

    fn validate_password(&self, password: &str) -> Result<(), DomainError> {
        if password.len() < self.config.min_password_len {
            return Err(DomainError::invalid_argument(format!(
                "Password must be at least {} characters",
                self.config.min_password_len
            )));
        }
        Ok(())
    }
}

/// Required-field validation for manager creation; also normalizes the
/// email to lowercase.
fn validate_new_manager(
    new: &NewManager,
) -> Result<(String, String, String, Shop), DomainError> {
    let missing = || DomainError::invalid_argument("Missing required fields");

    let manager_name = required(&new.manager_name).ok_or_else(missing)?;
    let email = required(&new.email).ok_or_else(missing)?.to_lowercase();
    let password = new
        .password
        .clone()
        .filter(|p| !p.is_empty())
        .ok_or_else(missing)?;
    let shop = new.shop.as_ref().ok_or_else(missing)?;
    let shop = validate_new_shop(shop).ok_or_else(missing)?;

    Ok((manager_name, email, password, shop))
}

fn validate_new_shop(shop: &NewShop) -> Option<Shop> {
    Some(Shop {
        name: required(&shop.name)?,
        id: required(&shop.id)?,
        address: required(&shop.address)?,
        phone: required(&shop.phone)?,
    })
}

fn required(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

fn merge_shop(current: &Shop, patch: &crate::domain::model::ShopPatch) -> Shop {
    Shop {
        name: patch.name.clone().unwrap_or_else(|| current.name.clone()),
        id: patch.id.clone().unwrap_or_else(|| current.id.clone()),
        address: patch
            .address
            .clone()
            .unwrap_or_else(|| current.address.clone()),
        phone: patch.phone.clone().unwrap_or_else(|| current.phone.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CartStatus;
    use crate::domain::repo::{CartsRepository, ManagersRepository};
    use crate::test_support::{new_manager_input, service_with_memory_repos};

    async fn status_of(carts: &dyn CartsRepository, id: &str) -> CartStatus {
        carts.find_by_id(id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn create_and_delete_round_trip_claims_and_releases() {
        let (svc, carts, _managers) = service_with_memory_repos();
        svc.create_cart("C1").await.unwrap();
        svc.create_cart("C2").await.unwrap();

        let manager = svc
            .create_manager(new_manager_input("m@shop.test", "S1", &["C1", "C2"]))
            .await
            .unwrap();
        assert_eq!(status_of(carts.as_ref(), "C1").await, CartStatus::InUse);
        assert_eq!(status_of(carts.as_ref(), "C2").await, CartStatus::InUse);

        svc.delete_manager(manager.id).await.unwrap();
        assert_eq!(status_of(carts.as_ref(), "C1").await, CartStatus::Available);
        assert_eq!(status_of(carts.as_ref(), "C2").await, CartStatus::Available);
    }

    #[tokio::test]
    async fn create_with_unavailable_cart_changes_nothing() {
        let (svc, carts, managers) = service_with_memory_repos();
        svc.create_cart("C1").await.unwrap();
        svc.update_cart_status("C1", Some("In Use".to_owned()))
            .await
            .unwrap();

        let err = svc
            .create_manager(new_manager_input("m@shop.test", "S1", &["C1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));

        // No manager created, cart status untouched.
        assert!(managers.list().await.unwrap().is_empty());
        assert_eq!(status_of(carts.as_ref(), "C1").await, CartStatus::InUse);
    }

    #[tokio::test]
    async fn reassignment_releases_claims_and_keeps_overlap() {
        let (svc, carts, _managers) = service_with_memory_repos();
        for id in ["C1", "C2", "C3"] {
            svc.create_cart(id).await.unwrap();
        }
        let manager = svc
            .create_manager(new_manager_input("m@shop.test", "S1", &["C1", "C2"]))
            .await
            .unwrap();

        let patch = ManagerPatch {
            assigned_carts: Some(vec!["C2".to_owned(), "C3".to_owned()]),
            ..ManagerPatch::default()
        };
        let updated = svc.update_manager(manager.id, patch).await.unwrap();
        assert_eq!(updated.assigned_carts, vec!["C2", "C3"]);

        assert_eq!(status_of(carts.as_ref(), "C1").await, CartStatus::Available);
        assert_eq!(status_of(carts.as_ref(), "C2").await, CartStatus::InUse);
        assert_eq!(status_of(carts.as_ref(), "C3").await, CartStatus::InUse);
    }

    #[tokio::test]
    async fn failed_reconciliation_aborts_the_manager_patch() {
        let (svc, _carts, _managers) = service_with_memory_repos();
        svc.create_cart("C1").await.unwrap();
        svc.create_cart("C2").await.unwrap();

        let first = svc
            .create_manager(new_manager_input("a@shop.test", "S1", &["C1"]))
            .await
            .unwrap();
        let second = svc
            .create_manager(new_manager_input("b@shop.test", "S2", &["C2"]))
            .await
            .unwrap();

        // Second manager cannot take C1 while the first holds it.
        let err = svc
            .update_manager(
                second.id,
                ManagerPatch {
                    assigned_carts: Some(vec!["C1".to_owned()]),
                    ..ManagerPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));

        let detail = svc.get_manager(second.id).await.unwrap();
        assert_eq!(detail.manager.assigned_carts, vec!["C2"]);
        let _ = first;
    }

    #[tokio::test]
    async fn email_and_shop_id_conflicts() {
        let (svc, _carts, _managers) = service_with_memory_repos();
        svc.create_manager(new_manager_input("a@shop.test", "S1", &[]))
            .await
            .unwrap();

        let err = svc
            .create_manager(new_manager_input("a@shop.test", "S2", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));

        let err = svc
            .create_manager(new_manager_input("b@shop.test", "S1", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn uniqueness_checks_on_update_exclude_self() {
        let (svc, _carts, _managers) = service_with_memory_repos();
        let manager = svc
            .create_manager(new_manager_input("a@shop.test", "S1", &[]))
            .await
            .unwrap();

        // Re-asserting its own email and shop id is not a conflict.
        let updated = svc
            .update_manager(
                manager.id,
                ManagerPatch {
                    email: Some("a@shop.test".to_owned()),
                    shop: Some(crate::domain::model::ShopPatch {
                        id: Some("S1".to_owned()),
                        ..Default::default()
                    }),
                    ..ManagerPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email, "a@shop.test");
        assert_eq!(updated.shop.id, "S1");
    }

    #[tokio::test]
    async fn shop_patch_merges_fields() {
        let (svc, _carts, _managers) = service_with_memory_repos();
        let manager = svc
            .create_manager(new_manager_input("a@shop.test", "S1", &[]))
            .await
            .unwrap();

        let updated = svc
            .update_manager(
                manager.id,
                ManagerPatch {
                    shop: Some(crate::domain::model::ShopPatch {
                        phone: Some("555-0000".to_owned()),
                        ..Default::default()
                    }),
                    ..ManagerPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.shop.phone, "555-0000");
        assert_eq!(updated.shop.id, "S1");
        assert_eq!(updated.shop.name, manager.shop.name);
    }

    #[tokio::test]
    async fn missing_required_fields_fail_creation() {
        let (svc, _carts, _managers) = service_with_memory_repos();
        let mut input = new_manager_input("a@shop.test", "S1", &[]);
        input.shop = None;

        let err = svc.create_manager(input).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn duplicate_ids_in_assignment_request_fail_conservatively() {
        let (svc, _carts, _managers) = service_with_memory_repos();
        svc.create_cart("C1").await.unwrap();

        let err = svc
            .create_manager(new_manager_input("a@shop.test", "S1", &["C1", "C1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn list_managers_is_newest_first_and_expands_carts() {
        let (svc, _carts, _managers) = service_with_memory_repos();
        svc.create_cart("C1").await.unwrap();
        svc.create_manager(new_manager_input("a@shop.test", "S1", &[]))
            .await
            .unwrap();
        svc.create_manager(new_manager_input("b@shop.test", "S2", &["C1"]))
            .await
            .unwrap();

        let details = svc.list_managers().await.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].manager.email, "b@shop.test");
        assert_eq!(details[0].carts.len(), 1);
        assert_eq!(details[0].carts[0].cart_id, "C1");
        assert_eq!(details[0].carts[0].status, CartStatus::InUse);
        assert!(details[1].carts.is_empty());
    }

    #[tokio::test]
    async fn email_is_normalized_to_lowercase() {
        let (svc, _carts, _managers) = service_with_memory_repos();
        let mut input = new_manager_input("MiXeD@Shop.Test", "S1", &[]);
        input.manager_name = Some("Mixed Case".to_owned());
        let manager = svc.create_manager(input).await.unwrap();
        assert_eq!(manager.email, "mixed@shop.test");

        let found = svc.get_manager_by_email("mixed@shop.test").await.unwrap();
        assert_eq!(found.id, manager.id);
    }
}
