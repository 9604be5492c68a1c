//! PostgreSQL pool construction and schema migration.

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Build the connection pool from the service configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "PostgreSQL pool ready"
    );

    Ok(pool)
}

/// Apply pending migrations from ./migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Liveness probe against the database.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // The URL is parsed before any connection is attempted, so this fails
    // without a database.
    #[tokio::test]
    async fn test_create_pool_rejects_malformed_url() {
        let config = DatabaseConfig {
            url: "not-a-connection-string".to_string(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_seconds: 1,
        };

        assert!(create_pool(&config).await.is_err());
    }
}
