// ================
// common/src/lib.rs
// ================
//! Common types shared between the `user-auth` library and its front ends.
//! This module defines the persisted user record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned user identifier
pub type UserId = u64;

/// A registered principal
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    /// Assigned by the store, never changes
    pub id: UserId,
    /// Normalized email, unique across users
    pub email: String,
    /// PHC-formatted password hash
    pub hashed_password: String,
    /// Token of the most recent session, if one was created
    #[serde(default)]
    pub session_id: Option<String>,
}

impl User {
    /// Create a user record without a session
    pub fn new(id: UserId, email: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            hashed_password: hashed_password.into(),
            session_id: None,
        }
    }

    /// Whether a session has been issued for this user
    pub fn has_session(&self) -> bool {
        self.session_id.is_some()
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("hashed_password", &"<redacted>")
            .field("session_id", &self.session_id.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
