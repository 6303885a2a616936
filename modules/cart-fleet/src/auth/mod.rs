//! Access gate boundary: credential verification and caller identity.
//!
//! The domain treats authentication as an external collaborator. This
//! module defines the contract (caller identity, failure taxonomy, the
//! gate/issuer/hasher traits); the JWT implementation lives in
//! [`jwt`] and the axum plumbing in [`extract`].

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod extract;
pub mod jwt;

pub use extract::AdminCaller;
pub use jwt::JwtAccessGate;

/// Resolved caller identity, tagged by role and carrying only the
/// fields that role's contract needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Admin { id: Uuid },
    Manager { id: Uuid, shop_id: String },
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Admin { id } | Self::Manager { id, .. } => *id,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Self::Admin { .. } => "admin",
            Self::Manager { .. } => "manager",
        }
    }
}

/// Authentication failure classification. Everything except
/// `Forbidden` maps to 401; `Forbidden` is the role check and maps
/// to 403.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication token required")]
    MissingCredential,

    #[error("Token expired. Please log in again.")]
    Expired,

    #[error("Invalid token. Please log in again.")]
    Malformed,

    #[error("Invalid token. User not found.")]
    PrincipalNotFound,

    #[error("Account is deactivated. Please contact administrator.")]
    InactivePrincipal,

    #[error("Admin privileges required")]
    Forbidden,

    #[error("Authentication server error")]
    Internal(String),
}

/// Verifies a bearer credential and resolves the caller behind it.
#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn authenticate(&self, bearer: Option<&str>) -> Result<Caller, AuthError>;
}

/// Signs a credential for a resolved caller.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, caller: &Caller) -> Result<String, AuthError>;
}

/// Password hashing boundary. Kept synchronous: bcrypt is CPU-bound
/// and short enough to run inline at this scale.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> anyhow::Result<String>;
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

/// The bootstrap administrative principal, seeded from configuration
/// at startup.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}
