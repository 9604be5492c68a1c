use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::SanitizedUser;
use crate::services::{PermissionResolver, ServiceError, SessionService};
use crate::store::CredentialStore;
use crate::utils::{verify_password, Password, PasswordHashString};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Login success payload: session token plus the role-derived profile.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub expires_utc: DateTime<Utc>,
    pub expires_in: i64,
    pub role_names: Vec<String>,
}

/// Login: credential verification and session issuance.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    sessions: SessionService,
    resolver: PermissionResolver,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        sessions: SessionService,
        resolver: PermissionResolver,
    ) -> Self {
        Self {
            store,
            sessions,
            resolver,
        }
    }

    /// Verify a username/password pair and issue a session token.
    ///
    /// An unknown username and a wrong password both fail with the same
    /// `InvalidCredentials`, so the response does not reveal which accounts
    /// exist.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let user = self
            .store
            .find_user_by_username(&req.username)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        verify_password(
            &Password::new(req.password),
            &PasswordHashString::new(user.password_hash.clone()),
        )
        .map_err(|_| ServiceError::InvalidCredentials)?;

        let (token, expires_utc) = self.sessions.issue(user.user_id)?;
        let resolved = self.resolver.get_permissions(user.user_id).await?;

        let mut role_names: Vec<String> = resolved.role_names.into_iter().collect();
        role_names.sort();

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(LoginResponse {
            token,
            user_id: user.user_id,
            expires_utc,
            expires_in: self.sessions.session_ttl_seconds(),
            role_names,
        })
    }

    /// The caller's own profile, with the password hash stripped.
    pub async fn profile(&self, user_id: Uuid) -> Result<SanitizedUser, ServiceError> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        Ok(user.into())
    }
}
