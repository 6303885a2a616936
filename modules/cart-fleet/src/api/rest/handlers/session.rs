//! Login handler: resolves credentials through the domain service and
//! hands the resulting caller to the token issuer.

use axum::extract::State;
use axum::Json;

use crate::api::rest::dto::{LoginReq, LoginResp};
use crate::api::rest::AppState;
use crate::problem::{ApiResult, Problem};

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> ApiResult<Json<LoginResp>> {
    let outcome = state.service.login(&req.email, &req.password).await?;
    let token = state.issuer.issue(&outcome.caller).map_err(Problem::from)?;
    Ok(Json(LoginResp {
        token,
        role: outcome.caller.role().to_owned(),
        manager: outcome.manager.map(Into::into),
    }))
}
