//! Axum plumbing for the access gate: bearer-token extractors and the
//! HTTP shape of authentication failures.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use http::{header, StatusCode};
use tracing::error;

use super::{AccessGate, AuthError, Caller};
use crate::problem::Problem;

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Any authenticated caller, admin or manager.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Caller);

impl<S> FromRequestParts<S> for CallerIdentity
where
    Arc<dyn AccessGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Arc::<dyn AccessGate>::from_ref(state);
        let caller = gate.authenticate(bearer_token(parts)).await?;
        Ok(Self(caller))
    }
}

/// An authenticated caller holding the admin role. Manager tokens are
/// rejected with `Forbidden`.
#[derive(Debug, Clone)]
pub struct AdminCaller(pub Caller);

impl<S> FromRequestParts<S> for AdminCaller
where
    Arc<dyn AccessGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CallerIdentity(caller) = CallerIdentity::from_request_parts(parts, state).await?;
        if !caller.is_admin() {
            return Err(AuthError::Forbidden);
        }
        Ok(Self(caller))
    }
}

impl From<AuthError> for Problem {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden => {
                Problem::new(StatusCode::FORBIDDEN, "Forbidden", err.to_string())
                    .with_code("forbidden")
            }
            AuthError::Internal(ref detail) => {
                error!(error = %detail, "auth backend failure");
                Problem::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Authentication server error",
                )
                .with_code("internal")
            }
            AuthError::MissingCredential => unauthorized(&err, "missing_credential"),
            AuthError::Expired => unauthorized(&err, "expired"),
            AuthError::Malformed => unauthorized(&err, "malformed"),
            AuthError::PrincipalNotFound => unauthorized(&err, "principal_not_found"),
            AuthError::InactivePrincipal => unauthorized(&err, "inactive_principal"),
        }
    }
}

fn unauthorized(err: &AuthError, code: &str) -> Problem {
    Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized", err.to_string()).with_code(code)
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        Problem::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::routing::get;
    use axum::Router;
    use chrono::Duration;
    use http::Request;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::jwt::JwtAccessGate;
    use crate::auth::{AdminAccount, TokenIssuer};
    use crate::infra::storage::memory::InMemoryManagersRepository;
    use crate::test_support::test_manager;

    async fn admin_only(AdminCaller(_): AdminCaller) -> &'static str {
        "ok"
    }

    fn fixture(managers: Arc<InMemoryManagersRepository>) -> (Router, Arc<JwtAccessGate>, Uuid) {
        let admin_id = Uuid::new_v4();
        let gate = Arc::new(JwtAccessGate::new(
            "test-secret",
            Duration::hours(1),
            managers,
            AdminAccount {
                id: admin_id,
                email: "admin@smartcart.test".to_owned(),
                password_hash: "unused".to_owned(),
            },
        ));
        let state: Arc<dyn AccessGate> = gate.clone();
        let app = Router::new()
            .route("/admin", get(admin_only))
            .with_state(state);
        (app, gate, admin_id)
    }

    async fn status_for(app: Router, auth: Option<String>) -> StatusCode {
        let mut builder = Request::builder().uri("/admin");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let (app, _gate, _) = fixture(Arc::new(InMemoryManagersRepository::default()));
        assert_eq!(status_for(app, None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_token_passes() {
        let (app, gate, admin_id) = fixture(Arc::new(InMemoryManagersRepository::default()));
        let token = gate.issue(&Caller::Admin { id: admin_id }).unwrap();
        assert_eq!(
            status_for(app, Some(format!("Bearer {token}"))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn manager_token_is_forbidden_on_admin_route() {
        use crate::domain::repo::ManagersRepository;

        let managers = Arc::new(InMemoryManagersRepository::default());
        let manager = test_manager("m@shop.test", "S1");
        let caller = Caller::Manager {
            id: manager.id,
            shop_id: "S1".to_owned(),
        };
        managers.insert(manager).await.unwrap();

        let (app, gate, _) = fixture(managers);
        let token = gate.issue(&caller).unwrap();
        assert_eq!(
            status_for(app, Some(format!("Bearer {token}"))).await,
            StatusCode::FORBIDDEN
        );
    }
}
