//! User model - identity records owned by the credential store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity. `user_id` is immutable once created; profile fields are not.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl User {
    pub fn new(
        organization_id: Uuid,
        username: String,
        email: String,
        password_hash: String,
        display_name: Option<String>,
    ) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            organization_id,
            username,
            email,
            password_hash,
            display_name,
            created_utc: Utc::now(),
        }
    }
}

/// User representation safe to return to clients (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizedUser {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl From<User> for SanitizedUser {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            organization_id: u.organization_id,
            username: u.username,
            email: u.email,
            display_name: u.display_name,
            created_utc: u.created_utc,
        }
    }
}
