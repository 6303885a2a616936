//! Wire DTOs. Cart payloads use snake_case field names; manager
//! payloads use camelCase. Manager responses never carry the password
//! hash.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::model::{
    Cart, CartSummary, CartUpdate, Complaint, ComplaintStatus, Manager, ManagerDetail,
    ManagerPatch, NewComplaint, NewManager, NewReview, NewShop, Review, Shop, ShopPatch,
};

// ---------------------------------------------------------------------
// Cart responses
// ---------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ComplaintDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub reported_by: String,
    pub date_reported: DateTime<Utc>,
    pub status: ComplaintStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_resolved: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
}

impl From<Complaint> for ComplaintDto {
    fn from(c: Complaint) -> Self {
        Self {
            kind: c.kind,
            description: c.description,
            reported_by: c.reported_by,
            date_reported: c.date_reported,
            status: c.status,
            date_resolved: c.date_resolved,
            resolved_by: c.resolved_by,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewDto {
    pub customer_id: String,
    pub rating: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
}

impl From<Review> for ReviewDto {
    fn from(r: Review) -> Self {
        Self {
            customer_id: r.customer_id,
            rating: r.rating,
            comment: r.comment,
            date: r.date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartDto {
    pub cart_id: String,
    pub status: String,
    pub location: String,
    pub complaints: Vec<ComplaintDto>,
    pub reviews: Vec<ReviewDto>,
    pub revenue: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Cart> for CartDto {
    fn from(cart: Cart) -> Self {
        Self {
            cart_id: cart.cart_id,
            status: cart.status.as_str().to_owned(),
            location: cart.location,
            complaints: cart.complaints.into_iter().map(Into::into).collect(),
            reviews: cart.reviews.into_iter().map(Into::into).collect(),
            revenue: cart.revenue,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }
}

/// Compact cart view embedded in expanded manager responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct CartSummaryDto {
    pub cart_id: String,
    pub status: String,
    pub location: String,
}

impl From<CartSummary> for CartSummaryDto {
    fn from(s: CartSummary) -> Self {
        Self {
            cart_id: s.cart_id,
            status: s.status.as_str().to_owned(),
            location: s.location,
        }
    }
}

// ---------------------------------------------------------------------
// Cart requests
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateCartReq {
    #[serde(default)]
    pub cart_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCartReq {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl From<UpdateCartReq> for CartUpdate {
    fn from(req: UpdateCartReq) -> Self {
        Self {
            status: req.status,
            location: req.location,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartStatusReq {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateComplaintReq {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reported_by: Option<String>,
}

impl From<CreateComplaintReq> for NewComplaint {
    fn from(req: CreateComplaintReq) -> Self {
        Self {
            kind: req.kind,
            description: req.description,
            reported_by: req.reported_by,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResolveComplaintReq {
    #[serde(default)]
    pub resolved_by: Option<String>,
}

/// Review input. `rating` stays a raw JSON value so the service can
/// apply its coerce-then-range-check contract.
#[derive(Debug, Deserialize)]
pub struct CreateReviewReq {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub rating: Option<serde_json::Value>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl From<CreateReviewReq> for NewReview {
    fn from(req: CreateReviewReq) -> Self {
        Self {
            customer_id: req.customer_id,
            rating: req.rating,
            comment: req.comment,
        }
    }
}

// ---------------------------------------------------------------------
// Manager responses
// ---------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ShopDto {
    pub name: String,
    pub id: String,
    pub address: String,
    pub phone: String,
}

impl From<Shop> for ShopDto {
    fn from(shop: Shop) -> Self {
        Self {
            name: shop.name,
            id: shop.id,
            address: shop.address,
            phone: shop.phone,
        }
    }
}

/// Manager view with assignments as raw cart ids; used where the
/// handler did not expand them.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDto {
    pub id: Uuid,
    pub manager_name: String,
    pub email: String,
    pub shop: ShopDto,
    pub assigned_carts: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Manager> for ManagerDto {
    fn from(m: Manager) -> Self {
        Self {
            id: m.id,
            manager_name: m.manager_name,
            email: m.email,
            shop: m.shop.into(),
            assigned_carts: m.assigned_carts,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Manager view with each assignment expanded to a cart summary.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDetailDto {
    pub id: Uuid,
    pub manager_name: String,
    pub email: String,
    pub shop: ShopDto,
    pub assigned_carts: Vec<CartSummaryDto>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ManagerDetail> for ManagerDetailDto {
    fn from(detail: ManagerDetail) -> Self {
        let m = detail.manager;
        Self {
            id: m.id,
            manager_name: m.manager_name,
            email: m.email,
            shop: m.shop.into(),
            assigned_carts: detail.carts.into_iter().map(Into::into).collect(),
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManagersListResp {
    pub managers: Vec<ManagerDetailDto>,
}

// ---------------------------------------------------------------------
// Manager requests
// ---------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ShopReq {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<ShopReq> for NewShop {
    fn from(req: ShopReq) -> Self {
        Self {
            name: req.name,
            id: req.id,
            address: req.address,
            phone: req.phone,
        }
    }
}

impl From<ShopReq> for ShopPatch {
    fn from(req: ShopReq) -> Self {
        Self {
            name: req.name,
            id: req.id,
            address: req.address,
            phone: req.phone,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateManagerReq {
    #[serde(default)]
    pub manager_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub shop: Option<ShopReq>,
    #[serde(default)]
    pub assigned_carts: Vec<String>,
}

impl From<CreateManagerReq> for NewManager {
    fn from(req: CreateManagerReq) -> Self {
        Self {
            manager_name: req.manager_name,
            email: req.email,
            password: req.password,
            shop: req.shop.map(Into::into),
            assigned_carts: req.assigned_carts,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateManagerReq {
    #[serde(default)]
    pub manager_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub shop: Option<ShopReq>,
    #[serde(default)]
    pub assigned_carts: Option<Vec<String>>,
}

impl From<UpdateManagerReq> for ManagerPatch {
    fn from(req: UpdateManagerReq) -> Self {
        Self {
            manager_name: req.manager_name,
            email: req.email,
            password: req.password,
            shop: req.shop.map(Into::into),
            assigned_carts: req.assigned_carts,
        }
    }
}

// ---------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginReq {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResp {
    pub token: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<ManagerDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResp {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::model::CartStatus;
    use crate::test_support::test_manager;

    #[test]
    fn cart_dto_uses_snake_case_and_renames_complaint_type() {
        let mut cart = Cart::new("C1".to_owned(), Utc::now());
        cart.complaints.push(Complaint {
            kind: "Broken wheel".to_owned(),
            description: String::new(),
            reported_by: "Anonymous".to_owned(),
            date_reported: Utc::now(),
            status: ComplaintStatus::Pending,
            date_resolved: None,
            resolved_by: None,
        });

        let json = serde_json::to_value(CartDto::from(cart)).unwrap();
        assert_eq!(json["cart_id"], "C1");
        assert_eq!(json["status"], "Available");
        assert_eq!(json["complaints"][0]["type"], "Broken wheel");
        assert!(json["complaints"][0].get("kind").is_none());
        assert!(json["complaints"][0].get("date_resolved").is_none());
    }

    #[test]
    fn manager_dto_is_camel_case_and_omits_password() {
        let manager = test_manager("m@shop.test", "S1");
        let json = serde_json::to_value(ManagerDto::from(manager)).unwrap();
        assert!(json.get("managerName").is_some());
        assert!(json.get("assignedCarts").is_some());
        assert!(json.get("isActive").is_some());
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn manager_detail_expands_assignments() {
        let mut manager = test_manager("m@shop.test", "S1");
        manager.assigned_carts = vec!["C1".to_owned()];
        let detail = ManagerDetail {
            manager,
            carts: vec![CartSummary {
                cart_id: "C1".to_owned(),
                status: CartStatus::InUse,
                location: "Aisle 3".to_owned(),
            }],
        };

        let json = serde_json::to_value(ManagerDetailDto::from(detail)).unwrap();
        assert_eq!(json["assignedCarts"][0]["cart_id"], "C1");
        assert_eq!(json["assignedCarts"][0]["status"], "In Use");
    }
}
