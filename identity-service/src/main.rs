use std::sync::Arc;

use identity_service::{
    build_router,
    config::IdentityConfig,
    db,
    services::{AuthGate, AuthService, InvitationService, PermissionResolver, RoleService, SessionService},
    store::{CredentialStore, PgStore},
    AppState,
};
use service_core::observability::logging::init_tracing;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = IdentityConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting identity service"
    );

    let pool = db::create_pool(&config.database)
        .await
        .map_err(|e| service_core::error::AppError::DatabaseError(anyhow::Error::new(e)))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| service_core::error::AppError::DatabaseError(anyhow::Error::new(e)))?;

    let store: Arc<dyn CredentialStore> = Arc::new(PgStore::new(pool.clone()));

    let sessions = SessionService::new(&config.session);
    let resolver = PermissionResolver::new(store.clone());
    let gate = AuthGate::new(store.clone(), sessions.clone(), resolver.clone());
    let auth_service = AuthService::new(store.clone(), sessions.clone(), resolver);
    let role_service = RoleService::new(store.clone());
    let invitation_service =
        InvitationService::new(store, sessions, config.invitation.default_ttl_seconds);

    let state = AppState {
        config: config.clone(),
        db: pool,
        gate,
        auth_service,
        role_service,
        invitation_service,
    };

    let app = build_router(state);

    let listener =
        tokio::net::TcpListener::bind((config.common.host.as_str(), config.common.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
