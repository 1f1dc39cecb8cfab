//! JWT session token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::data::types::UserRole;

/// JWT creation/validation error
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Session token has expired")]
    Expired,
    #[error("Invalid session token signature")]
    InvalidSignature,
    #[error("Invalid session token: {0}")]
    Invalid(String),
    #[error("Failed to create session token: {0}")]
    Encode(String),
}

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl SessionClaims {
    pub fn new(user_id: &str, role: UserRole, ttl_days: u32) -> Self {
        let now = Utc::now();
        let exp = now + Duration::days(ttl_days as i64);

        Self {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.sub
    }
}

/// Create a signed HS256 session token
pub fn create_session_token(signing_key: &[u8], claims: &SessionClaims) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(signing_key),
    )
    .map_err(|e| JwtError::Encode(e.to_string()))
}

/// Validate and decode a JWT session token
pub fn validate_session_token(token: &str, signing_key: &[u8]) -> Result<SessionClaims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data =
        decode::<SessionClaims>(token, &DecodingKey::from_secret(signing_key), &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::Invalid(e.to_string()),
            })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> Vec<u8> {
        vec![0u8; 32]
    }

    #[test]
    fn test_create_and_validate() {
        let key = test_key();
        let claims = SessionClaims::new("user123", UserRole::Organizer, 7);
        let token = create_session_token(&key, &claims).unwrap();
        let decoded = validate_session_token(&token, &key).unwrap();
        assert_eq!(decoded.user_id(), "user123");
        assert_eq!(decoded.role, UserRole::Organizer);
        assert_eq!(decoded.exp - decoded.iat, 7 * 24 * 3600);
    }

    #[test]
    fn test_invalid_signature() {
        let claims = SessionClaims::new("user123", UserRole::Participant, 7);
        let token = create_session_token(&[0u8; 32], &claims).unwrap();
        assert!(matches!(
            validate_session_token(&token, &[1u8; 32]),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let mut claims = SessionClaims::new("user123", UserRole::Participant, 7);
        claims.iat -= 30 * 24 * 3600;
        claims.exp = claims.iat + 3600;
        let token = create_session_token(&test_key(), &claims).unwrap();
        assert!(matches!(
            validate_session_token(&token, &test_key()),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_unique_jti() {
        let c1 = SessionClaims::new("u", UserRole::Participant, 7);
        let c2 = SessionClaims::new("u", UserRole::Participant, 7);
        assert_ne!(c1.jti, c2.jti);
    }
}
