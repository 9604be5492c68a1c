//! Invitation handlers.
//!
//! Issuing is a permission-gated operation; preview and acceptance are the
//! unauthenticated entry points reached from the invitation link.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
};
use validator::Validate;

use crate::models::{
    AcceptInvitationRequest, AcceptInvitationResponse, CreateInvitationRequest,
    CreateInvitationResponse, InvitationDetailsResponse, Permission,
};
use crate::services::{bearer_token, ServiceError};
use crate::AppState;
use service_core::error::AppError;

/// Issue an invitation carrying a starting role.
///
/// POST /invitations
#[tracing::instrument(skip_all, fields(role_id = %req.role_id))]
pub async fn create_invitation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<CreateInvitationResponse>), AppError> {
    let ctx = state
        .gate
        .authorize(bearer_token(&headers), &[Permission::InviteUsers])
        .await?;

    // Issuers can only invite into their own organization; anything else is
    // reported as a missing role.
    if req.organization_id != ctx.organization_id {
        return Err(ServiceError::NotFound("Role").into());
    }

    let response = state.invitation_service.issue(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Preview an invitation for the acceptance UI.
///
/// GET /invitations/{token}
#[tracing::instrument(skip_all)]
pub async fn get_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InvitationDetailsResponse>, AppError> {
    let details = state.invitation_service.preview(&token).await?;
    Ok(Json(details))
}

/// Accept an invitation, creating the new user.
///
/// POST /invitations/{token}/accept
#[tracing::instrument(skip_all)]
pub async fn accept_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<AcceptInvitationRequest>,
) -> Result<(StatusCode, Json<AcceptInvitationResponse>), AppError> {
    req.validate()?;

    let response = state.invitation_service.accept(&token, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
