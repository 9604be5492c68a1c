//! End-to-end authorization flow against the in-memory store: login, gated
//! operations, and the effect of role edits on subsequent requests.

use std::sync::Arc;

use uuid::Uuid;

use identity_service::config::SessionConfig;
use identity_service::models::{CreateRoleRequest, Permission, UpdateRoleRequest, User};
use identity_service::services::{
    AuthGate, AuthService, LoginRequest, PermissionResolver, RoleService, ServiceError,
    SessionService,
};
use identity_service::store::{CredentialStore, MemoryStore};
use identity_service::utils::{hash_password, Password};

struct Harness {
    store: Arc<MemoryStore>,
    sessions: SessionService,
    gate: AuthGate,
    auth: AuthService,
    roles: RoleService,
    organization_id: Uuid,
}

fn sessions() -> SessionService {
    SessionService::new(&SessionConfig {
        signing_secret: "integration-test-signing-secret".to_string(),
        issuer: "identity-service".to_string(),
        audience: "staffing-backend".to_string(),
        session_ttl_minutes: 15,
    })
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn CredentialStore> = store.clone();
    let sessions = sessions();
    let resolver = PermissionResolver::new(shared.clone());
    Harness {
        store,
        sessions: sessions.clone(),
        gate: AuthGate::new(shared.clone(), sessions.clone(), resolver.clone()),
        auth: AuthService::new(shared.clone(), sessions, resolver),
        roles: RoleService::new(shared),
        organization_id: Uuid::new_v4(),
    }
}

impl Harness {
    async fn create_user(&self, username: &str, password: &str) -> Uuid {
        let hash = hash_password(&Password::new(password.to_string())).unwrap();
        let user = User::new(
            self.organization_id,
            username.to_string(),
            format!("{}@example.com", username),
            hash.into_string(),
            None,
        );
        let user_id = user.user_id;
        self.store.create_user(&user).await.unwrap();
        user_id
    }

    async fn create_role_with(&self, name: &str, permissions: Vec<&str>) -> Uuid {
        self.roles
            .create_role(
                self.organization_id,
                CreateRoleRequest {
                    role_name: name.to_string(),
                    permissions: permissions.into_iter().map(String::from).collect(),
                },
            )
            .await
            .unwrap()
            .role_id
    }
}

#[tokio::test]
async fn login_then_access_gated_operation() {
    let h = harness();
    let user_id = h.create_user("dispatcher", "a sufficiently long password").await;
    let role_id = h
        .create_role_with("Scheduler", vec!["VIEW_SCHEDULE", "EDIT_SCHEDULE"])
        .await;
    h.roles
        .assign_role(h.organization_id, role_id, user_id)
        .await
        .unwrap();

    let login = h
        .auth
        .login(LoginRequest {
            username: "dispatcher".to_string(),
            password: "a sufficiently long password".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(login.role_names, vec!["Scheduler".to_string()]);

    let ctx = h
        .gate
        .authorize(Some(&login.token), &[Permission::EditSchedule])
        .await
        .unwrap();
    assert_eq!(ctx.user_id, user_id);
    assert_eq!(ctx.organization_id, h.organization_id);

    assert!(matches!(
        h.gate
            .authorize(Some(&login.token), &[Permission::ManageRoles])
            .await,
        Err(ServiceError::Forbidden)
    ));
}

#[tokio::test]
async fn role_edit_takes_effect_on_next_request() {
    let h = harness();
    let user_id = h.create_user("planner", "a sufficiently long password").await;
    let role_id = h.create_role_with("Planner", vec!["VIEW_SCHEDULE"]).await;
    h.roles
        .assign_role(h.organization_id, role_id, user_id)
        .await
        .unwrap();

    let (token, _) = h.sessions.issue(user_id).unwrap();
    assert!(matches!(
        h.gate
            .authorize(Some(&token), &[Permission::EditSchedule])
            .await,
        Err(ServiceError::Forbidden)
    ));

    // Widen the role; the already-issued token now carries the grant because
    // permissions are re-resolved on every request.
    h.roles
        .update_role(
            h.organization_id,
            role_id,
            UpdateRoleRequest {
                role_name: None,
                permissions: Some(vec![
                    "VIEW_SCHEDULE".to_string(),
                    "EDIT_SCHEDULE".to_string(),
                ]),
            },
        )
        .await
        .unwrap();

    assert!(h
        .gate
        .authorize(Some(&token), &[Permission::EditSchedule])
        .await
        .is_ok());
}

#[tokio::test]
async fn permissions_union_across_multiple_roles() {
    let h = harness();
    let user_id = h.create_user("lead", "a sufficiently long password").await;
    let viewer = h.create_role_with("Viewer", vec!["VIEW_SCHEDULE"]).await;
    let manager = h
        .create_role_with("Manager", vec!["MANAGE_ROLES", "INVITE_USERS"])
        .await;
    h.roles
        .assign_role(h.organization_id, viewer, user_id)
        .await
        .unwrap();
    h.roles
        .assign_role(h.organization_id, manager, user_id)
        .await
        .unwrap();

    let (token, _) = h.sessions.issue(user_id).unwrap();
    let ctx = h
        .gate
        .authorize(
            Some(&token),
            &[
                Permission::ViewSchedule,
                Permission::ManageRoles,
                Permission::InviteUsers,
            ],
        )
        .await
        .unwrap();
    assert!(!ctx.permissions.has(Permission::EditSchedule));
}

#[tokio::test]
async fn stale_grant_keys_do_not_block_authorization() {
    let h = harness();
    let user_id = h.create_user("veteran", "a sufficiently long password").await;
    let role_id = h
        .create_role_with("Legacy", vec!["VIEW_SCHEDULE", "RETIRED_GRANT"])
        .await;
    h.roles
        .assign_role(h.organization_id, role_id, user_id)
        .await
        .unwrap();

    let (token, _) = h.sessions.issue(user_id).unwrap();
    let ctx = h
        .gate
        .authorize(Some(&token), &[Permission::ViewSchedule])
        .await
        .unwrap();
    // The unrecognized key is dropped, not surfaced.
    assert_eq!(ctx.permissions.permissions.len(), 1);
}

#[tokio::test]
async fn garbage_and_foreign_tokens_are_unauthorized() {
    let h = harness();
    let user_id = h.create_user("anyone", "a sufficiently long password").await;

    assert!(matches!(
        h.gate.authorize(Some("not-a-jwt"), &[]).await,
        Err(ServiceError::MalformedToken)
    ));

    let foreign = SessionService::new(&SessionConfig {
        signing_secret: "some-other-service-secret".to_string(),
        issuer: "identity-service".to_string(),
        audience: "staffing-backend".to_string(),
        session_ttl_minutes: 15,
    });
    let (token, _) = foreign.issue(user_id).unwrap();
    assert!(matches!(
        h.gate.authorize(Some(&token), &[]).await,
        Err(ServiceError::InvalidToken)
    ));
}
