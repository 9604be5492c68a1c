//! In-memory credential store for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{CredentialStore, StoreError};
use crate::models::{Invitation, Role, User};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    roles: HashMap<Uuid, Role>,
    user_roles: Vec<(Uuid, Uuid, Uuid)>,
    invitations: HashMap<Uuid, Invitation>,
}

/// Mutex-held maps behind the same trait as `PgStore`. The mutex makes the
/// conditional mark-used a true atomic read-modify-write, matching the
/// guarantee the Postgres implementation gets from its WHERE clause.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(&user_id).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Duplicate(
                "username or email already registered".to_string(),
            ));
        }
        inner.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn get_roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let roles = inner
            .user_roles
            .iter()
            .filter(|(uid, _, _)| *uid == user_id)
            .filter_map(|(_, rid, _)| inner.roles.get(rid).cloned())
            .collect();
        Ok(roles)
    }

    async fn create_role(&self, role: &Role) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.roles.values().any(|r| {
            r.organization_id == role.organization_id && r.role_name == role.role_name
        }) {
            return Err(StoreError::Duplicate(
                "role name already exists in organization".to_string(),
            ));
        }
        inner.roles.insert(role.role_id, role.clone());
        Ok(())
    }

    async fn find_role(
        &self,
        organization_id: Uuid,
        role_id: Uuid,
    ) -> Result<Option<Role>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .roles
            .get(&role_id)
            .filter(|r| r.organization_id == organization_id)
            .cloned())
    }

    async fn list_roles(&self, organization_id: Uuid) -> Result<Vec<Role>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut roles: Vec<Role> = inner
            .roles
            .values()
            .filter(|r| r.organization_id == organization_id)
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.role_name.cmp(&b.role_name));
        Ok(roles)
    }

    async fn update_role(
        &self,
        organization_id: Uuid,
        role_id: Uuid,
        role_name: Option<String>,
        permissions: Option<Vec<String>>,
    ) -> Result<Option<Role>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.roles.get_mut(&role_id) {
            Some(role) if role.organization_id == organization_id => {
                if let Some(name) = role_name {
                    role.role_name = name;
                }
                if let Some(perms) = permissions {
                    role.permissions = perms;
                }
                Ok(Some(role.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn assign_role(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        organization_id: Uuid,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner
            .user_roles
            .iter()
            .any(|(uid, rid, _)| *uid == user_id && *rid == role_id)
        {
            inner.user_roles.push((user_id, role_id, organization_id));
        }
        Ok(())
    }

    async fn create_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .invitations
            .values()
            .any(|i| i.token_hash == invitation.token_hash)
        {
            return Err(StoreError::Duplicate("invitation token collision".to_string()));
        }
        inner
            .invitations
            .insert(invitation.invitation_id, invitation.clone());
        Ok(())
    }

    async fn find_invitation_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Invitation>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .invitations
            .values()
            .find(|i| i.token_hash == token_hash)
            .cloned())
    }

    async fn conditionally_mark_invitation_used(
        &self,
        invitation_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.invitations.get_mut(&invitation_id) {
            Some(invitation) if invitation.used_by_user_id.is_none() => {
                invitation.used_by_user_id = Some(user_id);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }
}
