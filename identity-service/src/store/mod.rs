//! Credential store - the narrow persistence interface the identity core
//! depends on.
//!
//! Everything above this trait treats the store as a black box that offers at
//! least single-row atomic conditional updates. `PgStore` is the production
//! implementation; `MemoryStore` backs the test suite.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Invitation, Role, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate record: {0}")]
    Duplicate(String),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    async fn create_user(&self, user: &User) -> Result<(), StoreError>;

    /// All roles assigned to a user, in no particular order. A user with no
    /// assignments yields an empty list, not an error.
    async fn get_roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, StoreError>;

    async fn create_role(&self, role: &Role) -> Result<(), StoreError>;

    /// Organization-scoped lookup; a role in another organization is absent.
    async fn find_role(
        &self,
        organization_id: Uuid,
        role_id: Uuid,
    ) -> Result<Option<Role>, StoreError>;

    async fn list_roles(&self, organization_id: Uuid) -> Result<Vec<Role>, StoreError>;

    /// Partial update; `None` fields are left unchanged. Returns the updated
    /// role, or `None` if the role does not exist in the organization.
    async fn update_role(
        &self,
        organization_id: Uuid,
        role_id: Uuid,
        role_name: Option<String>,
        permissions: Option<Vec<String>>,
    ) -> Result<Option<Role>, StoreError>;

    async fn assign_role(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        organization_id: Uuid,
    ) -> Result<(), StoreError>;

    async fn create_invitation(&self, invitation: &Invitation) -> Result<(), StoreError>;

    async fn find_invitation_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Invitation>, StoreError>;

    /// Atomically set `used_by_user_id` if and only if it is still unset.
    ///
    /// Returns true when this call won the transition; false means another
    /// redemption already claimed the invitation.
    async fn conditionally_mark_invitation_used(
        &self,
        invitation_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError>;
}
