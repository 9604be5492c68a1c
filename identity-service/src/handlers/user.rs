//! Caller-profile handlers.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::models::SanitizedUser;
use crate::services::bearer_token;
use crate::AppState;
use service_core::error::AppError;

/// The caller's own profile.
///
/// GET /users/me
#[tracing::instrument(skip_all)]
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SanitizedUser>, AppError> {
    let ctx = state.gate.authorize(bearer_token(&headers), &[]).await?;
    let profile = state.auth_service.profile(ctx.user_id).await?;
    Ok(Json(profile))
}

/// The caller's resolved roles and effective permissions.
#[derive(Debug, Serialize)]
pub struct MyPermissionsResponse {
    pub user_id: Uuid,
    pub role_names: Vec<String>,
    pub permissions: Vec<String>,
}

/// Resolve the caller's own effective permission set.
///
/// GET /users/me/permissions
#[tracing::instrument(skip_all)]
pub async fn my_permissions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MyPermissionsResponse>, AppError> {
    // Authentication only; no specific permission is required to see your
    // own grants.
    let ctx = state.gate.authorize(bearer_token(&headers), &[]).await?;

    let mut role_names: Vec<String> = ctx.permissions.role_names.into_iter().collect();
    role_names.sort();
    let mut permissions: Vec<String> = ctx
        .permissions
        .permissions
        .iter()
        .map(|p| p.as_key().to_string())
        .collect();
    permissions.sort();

    Ok(Json(MyPermissionsResponse {
        user_id: ctx.user_id,
        role_names,
        permissions,
    }))
}
