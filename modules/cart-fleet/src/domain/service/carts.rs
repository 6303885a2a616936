//! Cart store operations: CRUD plus the embedded complaint/review
//! sub-resource lifecycle. No cross-document effects originate here.

use chrono::Utc;
use tracing::{debug, info, instrument};

use super::Service;
use crate::domain::error::DomainError;
use crate::domain::model::{
    Cart, CartStatus, CartUpdate, Complaint, ComplaintStatus, NewComplaint, NewReview, Review,
};

/// Reporter recorded for complaints filed without one.
const ANONYMOUS_REPORTER: &str = "Anonymous";

impl Service {
    #[instrument(skip(self))]
    pub async fn create_cart(&self, cart_id: &str) -> Result<Cart, DomainError> {
        let cart_id = cart_id.trim();
        if cart_id.is_empty() {
            return Err(DomainError::invalid_argument("Cart ID is required"));
        }

        let existing = self
            .carts
            .find_by_id(cart_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if existing.is_some() {
            return Err(DomainError::conflict("Cart with this ID already exists"));
        }

        let cart = Cart::new(cart_id.to_owned(), Utc::now());
        self.carts
            .insert(cart.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(cart_id, "cart created");
        Ok(cart)
    }

    pub async fn get_cart(&self, cart_id: &str) -> Result<Cart, DomainError> {
        self.carts
            .find_by_id(cart_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::cart_not_found(cart_id))
    }

    pub async fn list_carts(&self) -> Result<Vec<Cart>, DomainError> {
        self.carts
            .list()
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    /// Field-level cart update. Sets `status` directly, bypassing the
    /// reconciler: a cart still claimed by a manager can be forced to
    /// another status here, transiently violating the assignment
    /// invariant until a later reconciliation corrects it. This is the
    /// manual `Maintenance` entry/exit path and a documented race.
    #[instrument(skip(self, update))]
    pub async fn update_cart(
        &self,
        cart_id: &str,
        update: CartUpdate,
    ) -> Result<Cart, DomainError> {
        let status = match update.status.as_deref() {
            Some(raw) => Some(
                CartStatus::parse(raw)
                    .ok_or_else(|| DomainError::invalid_argument("Invalid status value"))?,
            ),
            None => None,
        };

        let updated = self
            .carts
            .update_fields(cart_id, status, update.location)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::cart_not_found(cart_id))?;
        debug!(cart_id, status = ?updated.status, "cart updated");
        Ok(updated)
    }

    /// Status-only convenience path; `status` is required here.
    pub async fn update_cart_status(
        &self,
        cart_id: &str,
        status: Option<String>,
    ) -> Result<Cart, DomainError> {
        if status.is_none() {
            return Err(DomainError::invalid_argument("Invalid status value"));
        }
        self.update_cart(
            cart_id,
            CartUpdate {
                status,
                location: None,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_cart(&self, cart_id: &str) -> Result<(), DomainError> {
        let deleted = self
            .carts
            .delete(cart_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !deleted {
            return Err(DomainError::cart_not_found(cart_id));
        }
        info!(cart_id, "cart deleted");
        Ok(())
    }

    /// Append a complaint to the cart's log, created `Pending`.
    #[instrument(skip(self, complaint))]
    pub async fn add_complaint(
        &self,
        cart_id: &str,
        complaint: NewComplaint,
    ) -> Result<Cart, DomainError> {
        let kind = complaint
            .kind
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| DomainError::invalid_argument("Complaint type is required"))?
            .to_owned();

        let entry = Complaint {
            kind,
            description: complaint.description.unwrap_or_default(),
            reported_by: complaint
                .reported_by
                .unwrap_or_else(|| ANONYMOUS_REPORTER.to_owned()),
            date_reported: Utc::now(),
            status: ComplaintStatus::Pending,
            date_resolved: None,
            resolved_by: None,
        };

        self.carts
            .push_complaint(cart_id, entry)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::cart_not_found(cart_id))
    }

    /// Resolve the complaint at `index`. The transition is terminal but
    /// deliberately unguarded: re-resolving an already-resolved
    /// complaint is allowed and refreshes the resolution fields, since
    /// downstream consumers may rely on that permissiveness.
    #[instrument(skip(self, resolved_by))]
    pub async fn resolve_complaint(
        &self,
        cart_id: &str,
        index: usize,
        resolved_by: Option<String>,
    ) -> Result<Cart, DomainError> {
        let mut cart = self.get_cart(cart_id).await?;

        let complaint = cart
            .complaints
            .get_mut(index)
            .ok_or_else(|| DomainError::invalid_argument("Invalid complaint index"))?;
        complaint.status = ComplaintStatus::Resolved;
        complaint.date_resolved = Some(Utc::now());
        complaint.resolved_by = resolved_by;

        cart.updated_at = Utc::now();
        self.carts
            .save(cart)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::cart_not_found(cart_id))
    }

    /// Append an immutable review. `rating` is coerced from the raw
    /// JSON value, then range-checked to an integer in [1, 5].
    #[instrument(skip(self, review))]
    pub async fn add_review(&self, cart_id: &str, review: NewReview) -> Result<Cart, DomainError> {
        let customer_id = review
            .customer_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let (Some(customer_id), Some(raw_rating)) = (customer_id, review.rating.as_ref()) else {
            return Err(DomainError::invalid_argument(
                "Customer ID and rating are required",
            ));
        };

        let rating = coerce_rating(raw_rating)
            .filter(|r| (1..=5).contains(r))
            .and_then(|r| u8::try_from(r).ok())
            .ok_or_else(|| DomainError::invalid_argument("Rating must be between 1 and 5"))?;

        let entry = Review {
            customer_id: customer_id.to_owned(),
            rating,
            comment: review.comment.unwrap_or_default(),
            date: Utc::now(),
        };

        self.carts
            .push_review(cart_id, entry)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::cart_not_found(cart_id))
    }
}

/// Integer coercion for the review rating: JSON numbers are truncated
/// toward zero, strings are parsed the same way. Anything else is
/// non-numeric.
fn coerce_rating(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}
