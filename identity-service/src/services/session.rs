use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::services::ServiceError;

/// Session token issuer and verifier.
///
/// Signing key, issuer, and audience are process-wide configuration loaded
/// once at startup; the service holds them immutably for its lifetime.
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    session_ttl_minutes: i64,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
}

impl SessionService {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.signing_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.signing_secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            session_ttl_minutes: config.session_ttl_minutes,
        }
    }

    /// Issue a signed session token for a user.
    ///
    /// Expiration is strictly in the future relative to issuance.
    pub fn issue(&self, user_id: Uuid) -> Result<(String, DateTime<Utc>), ServiceError> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.session_ttl_minutes);

        let claims = SessionClaims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode session token: {}", e))?;

        Ok((token, expires_at))
    }

    /// Verify a session token and extract the caller's user id.
    ///
    /// Signature, expiry, issuer, and audience must all match exactly; there
    /// is no leniency or fallback. Failures map onto the three-way taxonomy:
    /// `ExpiredToken` for a past expiration, `InvalidToken` for a signature
    /// or claim mismatch, `MalformedToken` for anything unparseable.
    pub fn verify(&self, token: &str) -> Result<Uuid, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => ServiceError::ExpiredToken,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::ImmatureSignature => ServiceError::InvalidToken,
                _ => ServiceError::MalformedToken,
            })?;

        Uuid::parse_str(&token_data.claims.sub).map_err(|_| ServiceError::MalformedToken)
    }

    /// Session lifetime in seconds, for client display.
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SessionConfig {
        SessionConfig {
            signing_secret: "test-signing-secret-with-enough-entropy".to_string(),
            issuer: "identity-service".to_string(),
            audience: "staffing-backend".to_string(),
            session_ttl_minutes: 15,
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = SessionService::new(&test_config());
        let user_id = Uuid::new_v4();

        let (token, expires_at) = service.issue(user_id).expect("issue failed");
        assert!(!token.is_empty());
        assert!(expires_at > Utc::now());

        let verified = service.verify(&token).expect("verify failed");
        assert_eq!(verified, user_id);
    }

    #[test]
    fn test_rejects_token_signed_with_different_key() {
        let service = SessionService::new(&test_config());
        let other = SessionService::new(&SessionConfig {
            signing_secret: "a-completely-different-signing-secret".to_string(),
            ..test_config()
        });

        let (token, _) = other.issue(Uuid::new_v4()).expect("issue failed");
        assert!(matches!(
            service.verify(&token),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn test_rejects_expired_token() {
        let config = SessionConfig {
            session_ttl_minutes: -5,
            ..test_config()
        };
        let service = SessionService::new(&config);

        let (token, _) = service.issue(Uuid::new_v4()).expect("issue failed");
        assert!(matches!(
            service.verify(&token),
            Err(ServiceError::ExpiredToken)
        ));
    }

    #[test]
    fn test_rejects_corrupt_token() {
        let service = SessionService::new(&test_config());
        assert!(matches!(
            service.verify("not.a.jwt"),
            Err(ServiceError::MalformedToken)
        ));
        assert!(matches!(
            service.verify(""),
            Err(ServiceError::MalformedToken)
        ));
    }

    #[test]
    fn test_rejects_wrong_audience() {
        let issuing = SessionService::new(&SessionConfig {
            audience: "some-other-system".to_string(),
            ..test_config()
        });
        let service = SessionService::new(&test_config());

        let (token, _) = issuing.issue(Uuid::new_v4()).expect("issue failed");
        assert!(matches!(
            service.verify(&token),
            Err(ServiceError::InvalidToken)
        ));
    }
}
