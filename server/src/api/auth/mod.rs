//! Authentication module

pub mod jwt;
mod manager;
pub mod password;

pub use jwt::{JwtError, SessionClaims};
pub use manager::AuthManager;
pub use password::{PasswordError, hash_password, verify_password};
