//! Authentication handlers: login.

use axum::extract::{Json, State};
use validator::Validate;

use crate::services::{LoginRequest, LoginResponse};
use crate::AppState;
use service_core::error::AppError;

/// Authenticate with username and password.
///
/// POST /auth/login
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate()?;

    let response = state.auth_service.login(req).await?;
    Ok(Json(response))
}
