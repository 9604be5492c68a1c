use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub invitation: InvitationConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// Session token configuration: one signing key and one issuer/audience pair
/// for the whole process, loaded once at startup and never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub signing_secret: String,
    pub issuer: String,
    pub audience: String,
    pub session_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvitationConfig {
    pub default_ttl_seconds: i64,
}

impl IdentityConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = IdentityConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("identity-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: get_env("DATABASE_MAX_CONNECTIONS", Some("10"), is_prod)?
                    .parse()
                    .unwrap_or(10),
                min_connections: get_env("DATABASE_MIN_CONNECTIONS", Some("1"), is_prod)?
                    .parse()
                    .unwrap_or(1),
                acquire_timeout_seconds: get_env(
                    "DATABASE_ACQUIRE_TIMEOUT_SECONDS",
                    Some("30"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(30),
            },
            session: SessionConfig {
                signing_secret: get_env("SESSION_SIGNING_SECRET", None, is_prod)?,
                issuer: get_env("SESSION_ISSUER", Some("identity-service"), is_prod)?,
                audience: get_env("SESSION_AUDIENCE", Some("staffing-backend"), is_prod)?,
                session_ttl_minutes: get_env("SESSION_TTL_MINUTES", Some("60"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                    })?,
            },
            invitation: InvitationConfig {
                default_ttl_seconds: get_env(
                    "INVITATION_DEFAULT_TTL_SECONDS",
                    Some("604800"),
                    is_prod,
                )?
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                })?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.session.session_ttl_minutes <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SESSION_TTL_MINUTES must be positive"
            )));
        }

        if self.invitation.default_ttl_seconds < 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "INVITATION_DEFAULT_TTL_SECONDS must not be negative"
            )));
        }

        if self.environment == Environment::Prod && self.session.signing_secret.len() < 32 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SESSION_SIGNING_SECRET must be at least 32 bytes in production"
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
