//! JWT-backed access gate: HS256 tokens carrying subject id, role and
//! shop scope. Manager principals are re-checked against the manager
//! store on every request, so a deleted or deactivated manager's token
//! stops working immediately.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{AccessGate, AdminAccount, AuthError, Caller, TokenIssuer};
use crate::domain::repo::ManagersRepository;

const ROLE_ADMIN: &str = "admin";
const ROLE_MANAGER: &str = "manager";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    shop_id: Option<String>,
    iat: i64,
    exp: i64,
}

pub struct JwtAccessGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    managers: Arc<dyn ManagersRepository>,
    admin: AdminAccount,
}

impl JwtAccessGate {
    pub fn new(
        secret: &str,
        token_ttl: Duration,
        managers: Arc<dyn ManagersRepository>,
        admin: AdminAccount,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
            managers,
            admin,
        }
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed,
            })
    }
}

impl TokenIssuer for JwtAccessGate {
    fn issue(&self, caller: &Caller) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: caller.id().to_string(),
            role: caller.role().to_owned(),
            shop_id: match caller {
                Caller::Manager { shop_id, .. } => Some(shop_id.clone()),
                Caller::Admin { .. } => None,
            },
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

#[async_trait]
impl AccessGate for JwtAccessGate {
    async fn authenticate(&self, bearer: Option<&str>) -> Result<Caller, AuthError> {
        let token = bearer.ok_or(AuthError::MissingCredential)?;
        let claims = self.decode_claims(token)?;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Malformed)?;

        match claims.role.as_str() {
            ROLE_ADMIN => {
                if id != self.admin.id {
                    return Err(AuthError::PrincipalNotFound);
                }
                Ok(Caller::Admin { id })
            }
            ROLE_MANAGER => {
                let manager = self
                    .managers
                    .find_by_id(id)
                    .await
                    .map_err(|e| AuthError::Internal(e.to_string()))?
                    .ok_or(AuthError::PrincipalNotFound)?;
                if !manager.is_active {
                    return Err(AuthError::InactivePrincipal);
                }
                Ok(Caller::Manager {
                    id,
                    shop_id: manager.shop.id,
                })
            }
            other => {
                debug!(role = other, "token with unknown role");
                Err(AuthError::Malformed)
            }
        }
    }
}
