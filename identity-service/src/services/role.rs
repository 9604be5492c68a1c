use std::sync::Arc;

use uuid::Uuid;

use crate::models::{CreateRoleRequest, Role, UpdateRoleRequest};
use crate::services::ServiceError;
use crate::store::CredentialStore;

/// Role registry: organization-scoped role management.
///
/// Every lookup is keyed by the caller's organization. A role that exists in
/// another organization is reported `NotFound`, the same as one that does not
/// exist at all, so role ids never leak across organization boundaries.
#[derive(Clone)]
pub struct RoleService {
    store: Arc<dyn CredentialStore>,
}

impl RoleService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn create_role(
        &self,
        organization_id: Uuid,
        req: CreateRoleRequest,
    ) -> Result<Role, ServiceError> {
        if req.role_name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "role_name must not be empty".to_string(),
            ));
        }

        let role = Role::new(organization_id, req.role_name, req.permissions);
        self.store.create_role(&role).await?;

        tracing::info!(role_id = %role.role_id, organization_id = %organization_id, "Role created");
        Ok(role)
    }

    /// Partial update: unset fields are left unchanged.
    pub async fn update_role(
        &self,
        organization_id: Uuid,
        role_id: Uuid,
        req: UpdateRoleRequest,
    ) -> Result<Role, ServiceError> {
        if let Some(name) = &req.role_name {
            if name.trim().is_empty() {
                return Err(ServiceError::Validation(
                    "role_name must not be empty".to_string(),
                ));
            }
        }

        self.store
            .update_role(organization_id, role_id, req.role_name, req.permissions)
            .await?
            .ok_or(ServiceError::NotFound("Role"))
    }

    pub async fn get_role(
        &self,
        organization_id: Uuid,
        role_id: Uuid,
    ) -> Result<Role, ServiceError> {
        self.store
            .find_role(organization_id, role_id)
            .await?
            .ok_or(ServiceError::NotFound("Role"))
    }

    pub async fn list_roles(&self, organization_id: Uuid) -> Result<Vec<Role>, ServiceError> {
        Ok(self.store.list_roles(organization_id).await?)
    }

    pub async fn get_roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, ServiceError> {
        Ok(self.store.get_roles_for_user(user_id).await?)
    }

    /// Assign a role to a user. The role must exist in the caller's
    /// organization and the user must exist.
    pub async fn assign_role(
        &self,
        organization_id: Uuid,
        role_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ServiceError> {
        let role = self
            .store
            .find_role(organization_id, role_id)
            .await?
            .ok_or(ServiceError::NotFound("Role"))?;

        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        self.store
            .assign_role(user_id, role.role_id, organization_id)
            .await?;

        tracing::info!(user_id = %user_id, role_id = %role_id, "Role assigned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> RoleService {
        RoleService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_partial_update_leaves_unset_fields() {
        let svc = service();
        let org = Uuid::new_v4();
        let role = svc
            .create_role(
                org,
                CreateRoleRequest {
                    role_name: "Scheduler".to_string(),
                    permissions: vec!["VIEW_SCHEDULE".to_string(), "EDIT_SCHEDULE".to_string()],
                },
            )
            .await
            .unwrap();

        let updated = svc
            .update_role(
                org,
                role.role_id,
                UpdateRoleRequest {
                    role_name: Some("Shift Planner".to_string()),
                    permissions: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role_name, "Shift Planner");
        assert_eq!(updated.permissions, role.permissions);
    }

    #[tokio::test]
    async fn test_cross_organization_lookup_is_not_found() {
        let svc = service();
        let org = Uuid::new_v4();
        let other_org = Uuid::new_v4();
        let role = svc
            .create_role(
                org,
                CreateRoleRequest {
                    role_name: "Manager".to_string(),
                    permissions: vec![],
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            svc.get_role(other_org, role.role_id).await,
            Err(ServiceError::NotFound("Role"))
        ));
        assert!(matches!(
            svc.update_role(
                other_org,
                role.role_id,
                UpdateRoleRequest {
                    role_name: Some("Hijacked".to_string()),
                    permissions: None
                }
            )
            .await,
            Err(ServiceError::NotFound("Role"))
        ));
    }

    #[tokio::test]
    async fn test_empty_role_name_rejected() {
        let svc = service();
        assert!(matches!(
            svc.create_role(
                Uuid::new_v4(),
                CreateRoleRequest {
                    role_name: "  ".to_string(),
                    permissions: vec![],
                }
            )
            .await,
            Err(ServiceError::Validation(_))
        ));
    }
}
