//! Manager handlers. The whole surface is admin-only; the `AdminCaller`
//! extractor enforces both authentication and role.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::api::rest::dto::{
    CreateManagerReq, ManagerDetailDto, ManagerDto, ManagersListResp, MessageResp,
    UpdateManagerReq,
};
use crate::api::rest::AppState;
use crate::auth::AdminCaller;
use crate::problem::ApiResult;

pub async fn create_manager(
    AdminCaller(_): AdminCaller,
    State(state): State<AppState>,
    Json(req): Json<CreateManagerReq>,
) -> ApiResult<(StatusCode, Json<ManagerDto>)> {
    let manager = state.service.create_manager(req.into()).await?;
    Ok((StatusCode::CREATED, Json(manager.into())))
}

pub async fn list_managers(
    AdminCaller(_): AdminCaller,
    State(state): State<AppState>,
) -> ApiResult<Json<ManagersListResp>> {
    let details = state.service.list_managers().await?;
    Ok(Json(ManagersListResp {
        managers: details.into_iter().map(Into::into).collect(),
    }))
}

pub async fn get_manager(
    AdminCaller(_): AdminCaller,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ManagerDetailDto>> {
    let detail = state.service.get_manager(id).await?;
    Ok(Json(detail.into()))
}

pub async fn get_manager_by_email(
    AdminCaller(_): AdminCaller,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<ManagerDto>> {
    let manager = state.service.get_manager_by_email(&email).await?;
    Ok(Json(manager.into()))
}

pub async fn update_manager(
    AdminCaller(_): AdminCaller,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateManagerReq>,
) -> ApiResult<Json<ManagerDto>> {
    let manager = state.service.update_manager(id, req.into()).await?;
    Ok(Json(manager.into()))
}

pub async fn delete_manager(
    AdminCaller(_): AdminCaller,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResp>> {
    state.service.delete_manager(id).await?;
    Ok(Json(MessageResp {
        message: "Manager deleted successfully".to_owned(),
    }))
}
