//! REST surface: router, shared state, DTOs and the error mapping from
//! domain failures to RFC 9457 problem documents.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{AccessGate, TokenIssuer};
use crate::domain::service::Service;

pub mod dto;
mod error;
pub mod handlers;
pub mod routes;

pub use routes::router;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
    pub gate: Arc<dyn AccessGate>,
    pub issuer: Arc<dyn TokenIssuer>,
}

impl FromRef<AppState> for Arc<dyn AccessGate> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.gate)
    }
}
