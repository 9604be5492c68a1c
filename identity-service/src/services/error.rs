use service_core::error::AppError;
use thiserror::Error;

use crate::store::StoreError;

/// The identity core's error taxonomy. The authorization gate and the
/// invitation lifecycle are the only producers of the policy-level kinds;
/// store failures are translated here and never leaked raw.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Missing or invalid session")]
    Unauthorized,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Invalid token signature or claims")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invitation not found")]
    InvalidInvitation,

    #[error("Invitation expired")]
    ExpiredInvitation,

    #[error("Invitation already used")]
    AlreadyUsed,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthorized => {
                AppError::Unauthorized(anyhow::anyhow!("Missing or invalid session"))
            }
            ServiceError::Forbidden => {
                AppError::Forbidden(anyhow::anyhow!("Insufficient permissions"))
            }
            ServiceError::InvalidToken => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid token"))
            }
            ServiceError::ExpiredToken => {
                AppError::Unauthorized(anyhow::anyhow!("Token expired"))
            }
            ServiceError::MalformedToken => {
                AppError::Unauthorized(anyhow::anyhow!("Malformed token"))
            }
            ServiceError::InvalidCredentials => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::InvalidInvitation => {
                AppError::NotFound(anyhow::anyhow!("Invitation not found"))
            }
            ServiceError::ExpiredInvitation => {
                AppError::Gone(anyhow::anyhow!("Invitation expired"))
            }
            ServiceError::AlreadyUsed => {
                AppError::Conflict(anyhow::anyhow!("Invitation already used"))
            }
            ServiceError::NotFound(what) => {
                AppError::NotFound(anyhow::anyhow!("{} not found", what))
            }
            ServiceError::Validation(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            ServiceError::Store(e) => match e {
                StoreError::Duplicate(what) => AppError::Conflict(anyhow::anyhow!(what)),
                StoreError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            },
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
