//! Role registry handlers.
//!
//! All operations are scoped to the caller's organization and gated on
//! MANAGE_ROLES. A role outside that organization is indistinguishable from
//! one that does not exist.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
};
use uuid::Uuid;

use crate::models::{
    AssignRoleRequest, CreateRoleRequest, Permission, RoleResponse, UpdateRoleRequest,
};
use crate::services::bearer_token;
use crate::AppState;
use service_core::error::AppError;

/// Create a role.
///
/// POST /roles
#[tracing::instrument(skip_all)]
pub async fn create_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>), AppError> {
    let ctx = state
        .gate
        .authorize(bearer_token(&headers), &[Permission::ManageRoles])
        .await?;

    let role = state
        .role_service
        .create_role(ctx.organization_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(role.into())))
}

/// Partially update a role; unset fields are left unchanged.
///
/// PATCH /roles/{role_id}
#[tracing::instrument(skip_all, fields(role_id = %role_id))]
pub async fn update_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(role_id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<RoleResponse>, AppError> {
    let ctx = state
        .gate
        .authorize(bearer_token(&headers), &[Permission::ManageRoles])
        .await?;

    let role = state
        .role_service
        .update_role(ctx.organization_id, role_id, req)
        .await?;
    Ok(Json(role.into()))
}

/// Fetch one role.
///
/// GET /roles/{role_id}
#[tracing::instrument(skip_all, fields(role_id = %role_id))]
pub async fn get_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(role_id): Path<Uuid>,
) -> Result<Json<RoleResponse>, AppError> {
    let ctx = state
        .gate
        .authorize(bearer_token(&headers), &[Permission::ManageRoles])
        .await?;

    let role = state
        .role_service
        .get_role(ctx.organization_id, role_id)
        .await?;
    Ok(Json(role.into()))
}

/// List the organization's roles.
///
/// GET /roles
#[tracing::instrument(skip_all)]
pub async fn list_roles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<RoleResponse>>, AppError> {
    let ctx = state
        .gate
        .authorize(bearer_token(&headers), &[Permission::ManageRoles])
        .await?;

    let roles = state.role_service.list_roles(ctx.organization_id).await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

/// Assign a role to a user.
///
/// POST /roles/{role_id}/assign
#[tracing::instrument(skip_all, fields(role_id = %role_id))]
pub async fn assign_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(role_id): Path<Uuid>,
    Json(req): Json<AssignRoleRequest>,
) -> Result<StatusCode, AppError> {
    let ctx = state
        .gate
        .authorize(bearer_token(&headers), &[Permission::ManageRoles])
        .await?;

    state
        .role_service
        .assign_role(ctx.organization_id, role_id, req.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
