//! Cart handlers. The cart surface is unauthenticated; complaints and
//! reviews are public intake paths.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::rest::dto::{
    CartDto, CreateCartReq, CreateComplaintReq, CreateReviewReq, MessageResp, ResolveComplaintReq,
    UpdateCartReq, UpdateCartStatusReq,
};
use crate::api::rest::AppState;
use crate::domain::DomainError;
use crate::problem::ApiResult;

pub async fn create_cart(
    State(state): State<AppState>,
    Json(req): Json<CreateCartReq>,
) -> ApiResult<(StatusCode, Json<CartDto>)> {
    let cart = state
        .service
        .create_cart(req.cart_id.as_deref().unwrap_or_default())
        .await?;
    Ok((StatusCode::CREATED, Json(cart.into())))
}

pub async fn list_carts(State(state): State<AppState>) -> ApiResult<Json<Vec<CartDto>>> {
    let carts = state.service.list_carts().await?;
    Ok(Json(carts.into_iter().map(Into::into).collect()))
}

pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> ApiResult<Json<CartDto>> {
    let cart = state.service.get_cart(&cart_id).await?;
    Ok(Json(cart.into()))
}

pub async fn update_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    Json(req): Json<UpdateCartReq>,
) -> ApiResult<Json<CartDto>> {
    let cart = state.service.update_cart(&cart_id, req.into()).await?;
    Ok(Json(cart.into()))
}

pub async fn update_cart_status(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    Json(req): Json<UpdateCartStatusReq>,
) -> ApiResult<Json<CartDto>> {
    let cart = state
        .service
        .update_cart_status(&cart_id, req.status)
        .await?;
    Ok(Json(cart.into()))
}

pub async fn delete_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> ApiResult<Json<MessageResp>> {
    state.service.delete_cart(&cart_id).await?;
    Ok(Json(MessageResp {
        message: "Cart deleted successfully".to_owned(),
    }))
}

pub async fn add_complaint(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    Json(req): Json<CreateComplaintReq>,
) -> ApiResult<(StatusCode, Json<CartDto>)> {
    let cart = state.service.add_complaint(&cart_id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(cart.into())))
}

pub async fn resolve_complaint(
    State(state): State<AppState>,
    Path((cart_id, index)): Path<(String, String)>,
    Json(req): Json<ResolveComplaintReq>,
) -> ApiResult<Json<CartDto>> {
    // The index arrives as a path segment; non-numeric input gets the
    // same rejection as an out-of-range one.
    let index: usize = index
        .parse()
        .map_err(|_| DomainError::invalid_argument("Invalid complaint index"))?;
    let cart = state
        .service
        .resolve_complaint(&cart_id, index, req.resolved_by)
        .await?;
    Ok(Json(cart.into()))
}

pub async fn add_review(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    Json(req): Json<CreateReviewReq>,
) -> ApiResult<(StatusCode, Json<CartDto>)> {
    let cart = state.service.add_review(&cart_id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(cart.into())))
}
