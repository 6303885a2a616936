use thiserror::Error;
use uuid::Uuid;

/// Domain error taxonomy. Every variant maps to exactly one HTTP status
/// at the API boundary; messages are safe to show to callers.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    AuthFailure { message: String },

    #[error("storage error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn cart_not_found(cart_id: &str) -> Self {
        Self::NotFound {
            entity: "Cart",
            key: cart_id.to_owned(),
        }
    }

    pub fn manager_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Manager",
            key: id.to_string(),
        }
    }

    pub fn manager_not_found_by_email(email: &str) -> Self {
        Self::NotFound {
            entity: "Manager",
            key: email.to_owned(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self::AuthFailure {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
