use std::sync::Arc;

use axum::http::{header, HeaderMap};
use uuid::Uuid;

use crate::models::Permission;
use crate::services::{PermissionResolver, ServiceError, SessionService, UserPermissions};
use crate::store::CredentialStore;

/// The caller's verified identity and effective permissions, valid for the
/// duration of one request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub permissions: UserPermissions,
}

/// Authorization gate wrapped around every protected operation.
///
/// Verifies the bearer session token, resolves the caller's effective
/// permission set, and requires every listed permission (all-of semantics)
/// before the operation runs. Stateless and reentrant: nesting two gates on
/// one path is equivalent to an all-of check across their requirements.
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn CredentialStore>,
    sessions: SessionService,
    resolver: PermissionResolver,
}

impl AuthGate {
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

    /// Authorize a bearer token against a set of required permissions.
    ///
    /// A missing, malformed, expired, or badly signed token fails with the
    /// session error taxonomy (all render as 401); a valid identity lacking
    /// any required permission fails `Forbidden` (403). Permissions are
    /// re-read from the store on every call, so a role change takes effect on
    /// the very next request.
    pub async fn authorize(
        &self,
        bearer: Option<&str>,
        required: &[Permission],
    ) -> Result<AuthContext, ServiceError> {
        let token = bearer.ok_or(ServiceError::Unauthorized)?;
        let user_id = self.sessions.verify(token)?;

        // The subject must still exist; a deleted account's token is dead.
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::Unauthorized)?;

        let permissions = self.resolver.get_permissions(user_id).await?;

        for permission in required {
            if !permissions.has(*permission) {
                tracing::warn!(
                    user_id = %user_id,
                    required = %permission,
                    "Permission denied"
                );
                return Err(ServiceError::Forbidden);
            }
        }

        Ok(AuthContext {
            user_id,
            organization_id: user.organization_id,
            permissions,
        })
    }
}

/// Extract the bearer token from an Authorization header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}
