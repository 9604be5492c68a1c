use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::models::{
    AcceptInvitationRequest, AcceptInvitationResponse, CreateInvitationRequest,
    CreateInvitationResponse, Invitation, InvitationDetailsResponse, User,
};
use crate::services::{ServiceError, SessionService};
use crate::store::{CredentialStore, StoreError};
use crate::utils::{hash_password, Password};

const TOKEN_BYTES: usize = 32;

/// Invitation lifecycle: issue, preview, redeem.
///
/// Issuance is reached only through a permission-gated operation; acceptance
/// is the unauthenticated entry point. Single-use exclusivity rests entirely
/// on the store's conditional mark-used, never on in-process locking.
#[derive(Clone)]
pub struct InvitationService {
    store: Arc<dyn CredentialStore>,
    sessions: SessionService,
    default_ttl_seconds: i64,
}

impl InvitationService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        sessions: SessionService,
        default_ttl_seconds: i64,
    ) -> Self {
        Self {
            store,
            sessions,
            default_ttl_seconds,
        }
    }

    /// Issue a new invitation carrying a starting role.
    ///
    /// The returned token is shown exactly once; only its SHA-256 hash is
    /// stored. `role_name` is snapshotted so redemption is unaffected by
    /// later role renames. A ttl of zero produces an invitation that is
    /// already expired.
    pub async fn issue(
        &self,
        req: CreateInvitationRequest,
    ) -> Result<CreateInvitationResponse, ServiceError> {
        let ttl_seconds = req.ttl_seconds.unwrap_or(self.default_ttl_seconds);
        if ttl_seconds < 0 {
            return Err(ServiceError::Validation(
                "ttl_seconds must not be negative".to_string(),
            ));
        }
        // try_seconds and checked_add_signed keep an absurd ttl a 400, not a
        // panic.
        let ttl = Duration::try_seconds(ttl_seconds).ok_or_else(|| {
            ServiceError::Validation("ttl_seconds is out of range".to_string())
        })?;
        let expires_utc = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
            ServiceError::Validation("ttl_seconds is out of range".to_string())
        })?;

        let role = self
            .store
            .find_role(req.organization_id, req.role_id)
            .await?
            .ok_or(ServiceError::NotFound("Role"))?;

        let token = generate_token();

        let invitation = Invitation::new(
            req.organization_id,
            role.role_id,
            role.role_name,
            hash_token(&token),
            expires_utc,
        );
        let invitation_id = invitation.invitation_id;

        self.store.create_invitation(&invitation).await?;

        tracing::info!(
            invitation_id = %invitation_id,
            organization_id = %req.organization_id,
            role_id = %req.role_id,
            expires_utc = %expires_utc,
            "Invitation issued"
        );

        Ok(CreateInvitationResponse {
            invitation_id,
            token,
            expires_utc,
        })
    }

    /// Look up an invitation for the acceptance UI without redeeming it.
    pub async fn preview(&self, token: &str) -> Result<InvitationDetailsResponse, ServiceError> {
        let invitation = self
            .store
            .find_invitation_by_token_hash(&hash_token(token))
            .await?
            .ok_or(ServiceError::InvalidInvitation)?;

        Ok(InvitationDetailsResponse {
            organization_id: invitation.organization_id,
            role_name: invitation.role_name.clone(),
            expires_utc: invitation.expires_utc,
            is_valid: invitation.is_pending(Utc::now()),
        })
    }

    /// Redeem an invitation, creating the new user with the preassigned role.
    ///
    /// Expiry is checked before anything else: an expired invitation is
    /// rejected regardless of its used state. The redemption itself claims
    /// the invitation with a pre-generated user id via the store's
    /// conditional update, then creates the user; of two concurrent attempts
    /// on one token, exactly one wins the conditional update and the loser
    /// observes `AlreadyUsed`.
    pub async fn accept(
        &self,
        token: &str,
        req: AcceptInvitationRequest,
    ) -> Result<AcceptInvitationResponse, ServiceError> {
        let invitation = self
            .store
            .find_invitation_by_token_hash(&hash_token(token))
            .await?
            .ok_or(ServiceError::InvalidInvitation)?;

        let now = Utc::now();
        if invitation.is_expired(now) {
            return Err(ServiceError::ExpiredInvitation);
        }
        if invitation.is_redeemed() {
            return Err(ServiceError::AlreadyUsed);
        }

        // Reject a taken username before consuming the invitation, so a
        // rejected request leaves it redeemable. The unique index still
        // backstops the race this pre-check cannot close.
        if self
            .store
            .find_user_by_username(&req.username)
            .await?
            .is_some()
        {
            return Err(ServiceError::Validation(
                "username already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&Password::new(req.password))
            .map_err(|e| anyhow::anyhow!("Password hashing error: {}", e))?;

        let user = User::new(
            invitation.organization_id,
            req.username,
            req.email,
            password_hash.into_string(),
            req.display_name,
        );

        // Claim the invitation first. A crash between the claim and the user
        // insert consumes the invitation without creating a user; it can
        // never produce two users from one token or leave a redeemed
        // invitation re-redeemable.
        let claimed = self
            .store
            .conditionally_mark_invitation_used(invitation.invitation_id, user.user_id)
            .await?;
        if !claimed {
            return Err(ServiceError::AlreadyUsed);
        }

        match self.store.create_user(&user).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(what)) => {
                // Lost the username race after the pre-check. The invitation
                // is consumed; surface the conflict rather than leaking a
                // half-created account.
                tracing::warn!(
                    invitation_id = %invitation.invitation_id,
                    "Invitation claimed but user creation hit a duplicate"
                );
                return Err(ServiceError::Validation(what));
            }
            Err(e) => return Err(e.into()),
        }

        self.store
            .assign_role(user.user_id, invitation.role_id, invitation.organization_id)
            .await?;

        let (session_token, _) = self.sessions.issue(user.user_id)?;

        tracing::info!(
            user_id = %user.user_id,
            invitation_id = %invitation.invitation_id,
            "Invitation accepted"
        );

        Ok(AcceptInvitationResponse {
            user_id: user.user_id,
            token: session_token,
            expires_in: self.sessions.session_ttl_seconds(),
        })
    }
}

/// Generate an invitation token from a cryptographically secure source.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a token for storage.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
