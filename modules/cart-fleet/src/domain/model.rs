//! Domain entities for the cart fleet: carts with their embedded
//! complaint/review logs, and managers with their assigned cart sets.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Location assigned to a cart that is not deployed anywhere.
pub const WAREHOUSE_LOCATION: &str = "Warehouse";

/// Operational status of a cart.
///
/// `InUse` is owned by the assignment reconciler: it must hold exactly
/// when one manager's `assigned_carts` contains the cart id. Direct
/// status updates through the cart store bypass that coupling (a
/// documented race, see [`crate::domain::service::Reconciler`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartStatus {
    Available,
    #[serde(rename = "In Use")]
    InUse,
    Maintenance,
}

impl CartStatus {
    /// Parse the wire representation; `None` for anything outside the
    /// three-member enum.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Available" => Some(Self::Available),
            "In Use" => Some(Self::InUse),
            "Maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::InUse => "In Use",
            Self::Maintenance => "Maintenance",
        }
    }
}

impl std::fmt::Display for CartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a complaint: created `Pending`, transitions once
/// to `Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Pending,
    Resolved,
}

/// A maintenance complaint embedded in a cart. Complaints have no
/// identity beyond their position in the cart's complaint sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub kind: String,
    pub description: String,
    pub reported_by: String,
    pub date_reported: DateTime<Utc>,
    pub status: ComplaintStatus,
    pub date_resolved: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
}

/// A customer review embedded in a cart. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub customer_id: String,
    pub rating: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
}

/// A physical cart tracked by identifier, status, location, and its
/// embedded complaint/review history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub cart_id: String,
    pub status: CartStatus,
    pub location: String,
    pub complaints: Vec<Complaint>,
    pub reviews: Vec<Review>,
    pub revenue: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// A fresh cart: available, parked in the warehouse, empty logs.
    pub fn new(cart_id: String, now: DateTime<Utc>) -> Self {
        Self {
            cart_id,
            status: CartStatus::Available,
            location: WAREHOUSE_LOCATION.to_owned(),
            complaints: Vec::new(),
            reviews: Vec::new(),
            revenue: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Shop descriptor embedded in a manager. The sole shop representation;
/// there is no standalone shop collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    pub name: String,
    pub id: String,
    pub address: String,
    pub phone: String,
}

/// A principal responsible for one shop and a set of exclusively
/// assigned carts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manager {
    pub id: Uuid,
    pub manager_name: String,
    pub email: String,
    pub password_hash: String,
    pub shop: Shop,
    pub assigned_carts: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update to a cart's mutable fields. `status` is carried as
/// the raw wire string so the service can reject values outside the
/// enum with `InvalidArgument` rather than a deserialization failure.
#[derive(Debug, Clone, Default)]
pub struct CartUpdate {
    pub status: Option<String>,
    pub location: Option<String>,
}

/// Input for a new complaint; unset fields take their documented
/// defaults.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub kind: Option<String>,
    pub description: Option<String>,
    pub reported_by: Option<String>,
}

/// Input for a new review. `rating` is kept as raw JSON so the service
/// can apply the coerce-then-range-check contract.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub customer_id: Option<String>,
    pub rating: Option<serde_json::Value>,
    pub comment: Option<String>,
}

/// Input for creating a manager. Required fields are options here so
/// the service owns the "missing required fields" validation.
#[derive(Debug, Clone)]
pub struct NewManager {
    pub manager_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub shop: Option<NewShop>,
    pub assigned_carts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewShop {
    pub name: Option<String>,
    pub id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Partial patch for a manager. A present `assigned_carts` triggers
/// assignment reconciliation against the previous list.
#[derive(Debug, Clone, Default)]
pub struct ManagerPatch {
    pub manager_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub shop: Option<ShopPatch>,
    pub assigned_carts: Option<Vec<String>>,
}

/// Field-wise patch for the embedded shop descriptor.
#[derive(Debug, Clone, Default)]
pub struct ShopPatch {
    pub name: Option<String>,
    pub id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Compact cart view used when expanding a manager's assignment list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSummary {
    pub cart_id: String,
    pub status: CartStatus,
    pub location: String,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        Self {
            cart_id: cart.cart_id.clone(),
            status: cart.status,
            location: cart.location.clone(),
        }
    }
}

/// A manager with each assigned cart id expanded into a summary.
#[derive(Debug, Clone)]
pub struct ManagerDetail {
    pub manager: Manager,
    pub carts: Vec<CartSummary>,
}
