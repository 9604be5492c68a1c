//! PostgreSQL credential store.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use super::{CredentialStore, StoreError};
use crate::models::{Invitation, Role, User};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate(what.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, organization_id, username, email, password_hash, display_name, created_utc
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, organization_id, username, email, password_hash, display_name, created_utc
             FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (user_id, organization_id, username, email, password_hash, display_name, created_utc)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.user_id)
        .bind(user.organization_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "username or email already registered"))?;

        Ok(())
    }

    async fn get_roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, StoreError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT r.role_id, r.organization_id, r.role_name, r.permissions, r.created_utc
             FROM roles r
             JOIN user_roles ur ON ur.role_id = r.role_id
             WHERE ur.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn create_role(&self, role: &Role) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO roles (role_id, organization_id, role_name, permissions, created_utc)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(role.role_id)
        .bind(role.organization_id)
        .bind(&role.role_name)
        .bind(&role.permissions)
        .bind(role.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "role name already exists in organization"))?;

        Ok(())
    }

    async fn find_role(
        &self,
        organization_id: Uuid,
        role_id: Uuid,
    ) -> Result<Option<Role>, StoreError> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT role_id, organization_id, role_name, permissions, created_utc
             FROM roles WHERE role_id = $1 AND organization_id = $2",
        )
        .bind(role_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    async fn list_roles(&self, organization_id: Uuid) -> Result<Vec<Role>, StoreError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT role_id, organization_id, role_name, permissions, created_utc
             FROM roles WHERE organization_id = $1 ORDER BY role_name",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn update_role(
        &self,
        organization_id: Uuid,
        role_id: Uuid,
        role_name: Option<String>,
        permissions: Option<Vec<String>>,
    ) -> Result<Option<Role>, StoreError> {
        let role = sqlx::query_as::<_, Role>(
            "UPDATE roles
             SET role_name = COALESCE($3, role_name),
                 permissions = COALESCE($4, permissions)
             WHERE role_id = $1 AND organization_id = $2
             RETURNING role_id, organization_id, role_name, permissions, created_utc",
        )
        .bind(role_id)
        .bind(organization_id)
        .bind(role_name)
        .bind(permissions)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "role name already exists in organization"))?;

        Ok(role)
    }

    async fn assign_role(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        organization_id: Uuid,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id, organization_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO invitations (invitation_id, organization_id, role_id, role_name, token_hash, expires_utc, used_by_user_id, created_utc)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(invitation.invitation_id)
        .bind(invitation.organization_id)
        .bind(invitation.role_id)
        .bind(&invitation.role_name)
        .bind(&invitation.token_hash)
        .bind(invitation.expires_utc)
        .bind(invitation.used_by_user_id)
        .bind(invitation.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "invitation token collision"))?;

        Ok(())
    }

    async fn find_invitation_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Invitation>, StoreError> {
        let invitation = sqlx::query_as::<_, Invitation>(
            "SELECT invitation_id, organization_id, role_id, role_name, token_hash, expires_utc, used_by_user_id, created_utc
             FROM invitations WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invitation)
    }

    async fn conditionally_mark_invitation_used(
        &self,
        invitation_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError> {
        // Single-row conditional update: the WHERE clause makes concurrent
        // redemptions serialize so exactly one caller sees rows_affected = 1.
        let result = sqlx::query(
            "UPDATE invitations SET used_by_user_id = $2
             WHERE invitation_id = $1 AND used_by_user_id IS NULL",
        )
        .bind(invitation_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
