use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::models::Permission;
use crate::services::ServiceError;
use crate::store::CredentialStore;

/// A user's effective permission set, derived fresh for one authorization
/// decision and discarded afterwards. Never cached, never persisted.
#[derive(Debug, Clone)]
pub struct UserPermissions {
    pub role_names: HashSet<String>,
    pub permissions: HashSet<Permission>,
}

impl UserPermissions {
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Aggregates a user's roles into one effective permission set.
///
/// Read-only and side-effect free; safe to call repeatedly and concurrently
/// for the same user without coordination.
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn CredentialStore>,
}

impl PermissionResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Resolve the union of permissions across all roles held by a user.
    ///
    /// Grant strings that no longer match the catalog are dropped silently; a
    /// role's persisted grant set may reference permissions removed from a
    /// later catalog version. A user with no roles resolves to an empty set.
    pub async fn get_permissions(&self, user_id: Uuid) -> Result<UserPermissions, ServiceError> {
        let roles = self.store.get_roles_for_user(user_id).await?;

        let mut role_names = HashSet::new();
        let mut permissions = HashSet::new();

        for role in roles {
            role_names.insert(role.role_name);
            for key in &role.permissions {
                match Permission::from_key(key) {
                    Some(permission) => {
                        permissions.insert(permission);
                    }
                    None => {
                        tracing::debug!(user_id = %user_id, key = %key, "Dropping stale permission grant");
                    }
                }
            }
        }

        Ok(UserPermissions {
            role_names,
            permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::store::MemoryStore;

    async fn store_with_roles(roles: Vec<Role>, user_id: Uuid) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for role in roles {
            let org = role.organization_id;
            let role_id = role.role_id;
            store.create_role(&role).await.unwrap();
            store.assign_role(user_id, role_id, org).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_union_across_roles_with_dedup() {
        let org = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let manager = Role::new(
            org,
            "Manager".to_string(),
            vec![
                "VIEW_REPORTS_ORGANIZATION".to_string(),
                "EDIT_INVENTORY".to_string(),
            ],
        );
        let viewer = Role::new(
            org,
            "Viewer".to_string(),
            vec!["VIEW_REPORTS_ORGANIZATION".to_string()],
        );

        let store = store_with_roles(vec![manager, viewer], user_id).await;
        let resolver = PermissionResolver::new(store);

        let resolved = resolver.get_permissions(user_id).await.unwrap();
        assert_eq!(
            resolved.permissions,
            HashSet::from([Permission::ViewReportsOrganization, Permission::EditInventory])
        );
        assert_eq!(
            resolved.role_names,
            HashSet::from(["Manager".to_string(), "Viewer".to_string()])
        );
    }

    #[tokio::test]
    async fn test_unknown_grants_are_dropped_silently() {
        let org = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let role = Role::new(
            org,
            "Legacy".to_string(),
            vec![
                "VIEW_SCHEDULE".to_string(),
                "RETIRED_PERMISSION".to_string(),
                "".to_string(),
            ],
        );

        let store = store_with_roles(vec![role], user_id).await;
        let resolver = PermissionResolver::new(store);

        let resolved = resolver.get_permissions(user_id).await.unwrap();
        assert_eq!(resolved.permissions, HashSet::from([Permission::ViewSchedule]));
    }

    #[tokio::test]
    async fn test_no_roles_resolves_to_empty_set() {
        let store = Arc::new(MemoryStore::new());
        let resolver = PermissionResolver::new(store);

        let resolved = resolver.get_permissions(Uuid::new_v4()).await.unwrap();
        assert!(resolved.permissions.is_empty());
        assert!(resolved.role_names.is_empty());
    }
}
