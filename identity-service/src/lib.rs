pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPool;
use tower_http::trace::TraceLayer;

use crate::config::IdentityConfig;
use crate::services::{AuthGate, AuthService, InvitationService, RoleService};
use service_core::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: IdentityConfig,
    pub db: PgPool,
    pub gate: AuthGate,
    pub auth_service: AuthService,
    pub role_service: RoleService,
    pub invitation_service: InvitationService,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(handlers::auth::login))
        .route("/users/me", get(handlers::user::me))
        .route("/users/me/permissions", get(handlers::user::my_permissions))
        .route(
            "/roles",
            post(handlers::role::create_role).get(handlers::role::list_roles),
        )
        .route(
            "/roles/:role_id",
            get(handlers::role::get_role).patch(handlers::role::update_role),
        )
        .route("/roles/:role_id/assign", post(handlers::role::assign_role))
        .route(
            "/invitations",
            post(handlers::invitation::create_invitation),
        )
        .route(
            "/invitations/:token",
            get(handlers::invitation::get_invitation),
        )
        .route(
            "/invitations/:token/accept",
            post(handlers::invitation::accept_invitation),
        )
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
}

/// Service health check
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    db::health_check(&state.db).await.map_err(|e| {
        tracing::error!(error = %e, "Database health check failed");
        AppError::DatabaseError(anyhow::Error::new(e))
    })?;

    Ok(axum::Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "checks": {
            "postgres": "up"
        }
    })))
}
