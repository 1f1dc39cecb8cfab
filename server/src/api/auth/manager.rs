//! Session manager: signing key, cookie settings, token issue/validation

use axum_extra::extract::cookie::{Cookie, SameSite};

use super::jwt::{JwtError, SessionClaims, create_session_token, validate_session_token};
use crate::core::config::AuthConfig;
use crate::core::constants::SESSION_COOKIE_NAME;
use crate::data::types::UserRow;
use crate::utils::crypto;

#[derive(Debug)]
pub struct AuthManager {
    signing_key: Vec<u8>,
    ttl_days: u32,
    secure_cookie: bool,
    ephemeral: bool,
}

impl AuthManager {
    /// Build from config; without a configured secret a random one is
    /// generated and sessions do not survive a restart.
    pub fn new(config: &AuthConfig) -> Self {
        let (signing_key, ephemeral) = match &config.session_secret {
            Some(secret) => (secret.as_bytes().to_vec(), false),
            None => {
                tracing::warn!(
                    "No session secret configured; using a random key (sessions end on restart)"
                );
                (crypto::generate_signing_key(), true)
            }
        };

        Self {
            signing_key,
            ttl_days: config.session_ttl_days,
            secure_cookie: config.secure_cookie,
            ephemeral,
        }
    }

    /// True when the signing key was generated for this process
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Issue a signed session token for a user
    pub fn issue_session(&self, user: &UserRow) -> Result<String, JwtError> {
        let claims = SessionClaims::new(&user.id, user.role, self.ttl_days);
        create_session_token(&self.signing_key, &claims)
    }

    pub fn validate_session(&self, jwt: &str) -> Result<SessionClaims, JwtError> {
        validate_session_token(jwt, &self.signing_key)
    }

    /// HTTP-only session cookie carrying `token`
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, token))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .path("/")
            .max_age(time::Duration::days(self.ttl_days as i64))
            .build()
    }

    /// Expired cookie that clears the session
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, ""))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .path("/")
            .max_age(time::Duration::seconds(0))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::UserRole;

    fn config(secret: Option<&str>) -> AuthConfig {
        AuthConfig {
            session_secret: secret.map(str::to_string),
            session_ttl_days: 7,
            secure_cookie: false,
        }
    }

    fn user() -> UserRow {
        UserRow {
            id: "u1".to_string(),
            email: "a@b.c".to_string(),
            password_hash: String::new(),
            role: UserRole::Admin,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_configured_secret_survives_new_manager() {
        let secret = "s".repeat(32);
        let first = AuthManager::new(&config(Some(&secret)));
        let token = first.issue_session(&user()).unwrap();

        let second = AuthManager::new(&config(Some(&secret)));
        assert!(!second.is_ephemeral());
        let claims = second.validate_session(&token).unwrap();
        assert_eq!(claims.user_id(), "u1");
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn test_random_secret_is_per_instance() {
        let first = AuthManager::new(&config(None));
        assert!(first.is_ephemeral());
        let token = first.issue_session(&user()).unwrap();

        let second = AuthManager::new(&config(None));
        assert!(second.validate_session(&token).is_err());
    }

    #[test]
    fn test_cookie_attributes() {
        let manager = AuthManager::new(&config(None));
        let cookie = manager.session_cookie("tok".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }
}
