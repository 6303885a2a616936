//! Domain error to problem-document mapping. Internal details never
//! reach the wire; they are logged and replaced with a generic message.

use http::StatusCode;
use tracing::error;

use crate::domain::DomainError;
use crate::problem::Problem;

impl From<DomainError> for Problem {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => {
                Problem::new(StatusCode::NOT_FOUND, "Not Found", err.to_string())
                    .with_code("not_found")
            }
            DomainError::InvalidArgument { .. } => {
                Problem::new(StatusCode::BAD_REQUEST, "Bad Request", err.to_string())
                    .with_code("invalid_argument")
            }
            DomainError::Conflict { .. } => {
                Problem::new(StatusCode::CONFLICT, "Conflict", err.to_string())
                    .with_code("conflict")
            }
            DomainError::AuthFailure { .. } => {
                Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized", err.to_string())
                    .with_code("auth_failure")
            }
            DomainError::Internal { ref message } => {
                error!(error = %message, "internal error reached the API boundary");
                Problem::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Internal server error",
                )
                .with_code("internal")
            }
        }
    }
}
