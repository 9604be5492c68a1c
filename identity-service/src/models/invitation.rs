//! Invitation model - single-use, expiring onboarding tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Invitation entity.
///
/// The raw token is returned to the issuer once and stored only as a SHA-256
/// hash. `role_name` is a snapshot taken at creation so redemption is
/// unaffected by later role renames. Rows are never deleted; a row is
/// logically dead once `used_by_user_id` is set or `expires_utc` has passed.
#[derive(Debug, Clone, FromRow)]
pub struct Invitation {
    pub invitation_id: Uuid,
    pub organization_id: Uuid,
    pub role_id: Uuid,
    pub role_name: String,
    pub token_hash: String,
    pub expires_utc: DateTime<Utc>,
    pub used_by_user_id: Option<Uuid>,
    pub created_utc: DateTime<Utc>,
}

impl Invitation {
    pub fn new(
        organization_id: Uuid,
        role_id: Uuid,
        role_name: String,
        token_hash: String,
        expires_utc: DateTime<Utc>,
    ) -> Self {
        Self {
            invitation_id: Uuid::new_v4(),
            organization_id,
            role_id,
            role_name,
            token_hash,
            expires_utc,
            used_by_user_id: None,
            created_utc: Utc::now(),
        }
    }

    /// Expiry is a computed predicate, not a stored state.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_utc
    }

    pub fn is_redeemed(&self) -> bool {
        self.used_by_user_id.is_some()
    }

    /// Pending means unused and unexpired.
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        !self.is_redeemed() && !self.is_expired(now)
    }
}

/// Request to issue an invitation. A missing ttl falls back to the
/// configured default.
#[derive(Debug, Deserialize)]
pub struct CreateInvitationRequest {
    pub organization_id: Uuid,
    pub role_id: Uuid,
    pub ttl_seconds: Option<i64>,
}

/// Response after issuing an invitation. The token is delivered out-of-band
/// by the caller; this is the only time it is visible.
#[derive(Debug, Serialize)]
pub struct CreateInvitationResponse {
    pub invitation_id: Uuid,
    pub token: String,
    pub expires_utc: DateTime<Utc>,
}

/// Invitation details for the acceptance UI.
#[derive(Debug, Serialize)]
pub struct InvitationDetailsResponse {
    pub organization_id: Uuid,
    pub role_name: String,
    pub expires_utc: DateTime<Utc>,
    pub is_valid: bool,
}

/// Request to accept an invitation and create the new user.
#[derive(Debug, Deserialize, Validate)]
pub struct AcceptInvitationRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(email)]
    pub email: String,
    pub display_name: Option<String>,
}

/// Response after accepting an invitation; the new user is logged straight in.
#[derive(Debug, Serialize)]
pub struct AcceptInvitationResponse {
    pub user_id: Uuid,
    pub token: String,
    pub expires_in: i64,
}
