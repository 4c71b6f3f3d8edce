// =============
// crates/auth-lib/src/auth/service.rs
// =============
//! This module defines the `AuthService` trait, the entry point for
//! registration, login checks and session creation.
use async_trait::async_trait;
use user_auth_common::User;

use crate::error::AuthError;

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user. Fails with `AlreadyExists` if the email is taken.
    async fn register_user(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Check credentials. Unknown emails and wrong passwords are both `Ok(false)`.
    async fn valid_login(&self, email: &str, password: &str) -> Result<bool, AuthError>;

    /// Issue a new session token for the user, replacing any previous one.
    async fn create_session(&self, email: &str) -> Result<String, AuthError>;

    /// Look up the user holding `session_id`.
    async fn get_user_from_session_id(&self, session_id: &str) -> Result<Option<User>, AuthError>;
}
