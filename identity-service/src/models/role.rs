//! Role model - organization-scoped permission bundles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role entity (organization-scoped).
///
/// `permissions` holds free-form grant strings; they are validated against
/// the catalog only at resolution time, so a role may carry keys the current
/// catalog no longer recognizes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub role_id: Uuid,
    pub organization_id: Uuid,
    pub role_name: String,
    pub permissions: Vec<String>,
    pub created_utc: DateTime<Utc>,
}

impl Role {
    pub fn new(organization_id: Uuid, role_name: String, permissions: Vec<String>) -> Self {
        Self {
            role_id: Uuid::new_v4(),
            organization_id,
            role_name,
            permissions,
            created_utc: Utc::now(),
        }
    }
}

/// Request to create a role.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub role_name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Partial role update; unset fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role_name: Option<String>,
    pub permissions: Option<Vec<String>>,
}

/// Request to assign a role to a user.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub user_id: Uuid,
}

/// Role response for API.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role_id: Uuid,
    pub organization_id: Uuid,
    pub role_name: String,
    pub permissions: Vec<String>,
    pub created_utc: DateTime<Utc>,
}

impl From<Role> for RoleResponse {
    fn from(r: Role) -> Self {
        Self {
            role_id: r.role_id,
            organization_id: r.organization_id,
            role_name: r.role_name,
            permissions: r.permissions,
            created_utc: r.created_utc,
        }
    }
}
