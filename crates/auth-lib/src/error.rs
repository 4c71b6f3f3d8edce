// ============================
// crates/auth-lib/src/error.rs
// ============================
//! Error types for the user store and the auth service.
use thiserror::Error;

/// Failures reported by a [`crate::storage::UserStore`] backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No user found: {0}")]
    NotFound(String),

    #[error("Uniqueness conflict: {0}")]
    Conflict(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("User id space exhausted")]
    Exhausted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Authentication error types with error codes
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("User {0} already exists")]
    AlreadyExists(String),

    #[error("User {0} not found")]
    NotFound(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Malformed password hash: {0}")]
    MalformedSecret(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Password does not meet the configured requirements")]
    WeakPassword,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Could not generate a unique session token after {0} attempts")]
    TokenCollision(usize),

    #[error("Session token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::AlreadyExists(_) => "AUTH_001",
            AuthError::NotFound(_) => "NF_001",
            AuthError::InvalidField(_) => "VAL_001",
            AuthError::MalformedSecret(_) => "AUTH_002",
            AuthError::InvalidEmail(_) => "VAL_002",
            AuthError::WeakPassword => "VAL_003",
            AuthError::Hashing(_) => "INT_001",
            AuthError::TokenCollision(_) => "INT_002",
            AuthError::TokenGeneration(_) => "INT_003",
            AuthError::Storage(_) => "IO_001",
        }
    }

    /// Get a message that does not echo user input or internals
    pub fn sanitized_message(&self) -> String {
        match self {
            AuthError::AlreadyExists(_) => "User already exists".to_string(),
            AuthError::NotFound(_) => "User not found".to_string(),
            AuthError::InvalidField(_) => "Invalid input provided".to_string(),
            AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
            AuthError::WeakPassword => "Password is too weak".to_string(),
            AuthError::MalformedSecret(_)
            | AuthError::Hashing(_)
            | AuthError::TokenCollision(_)
            | AuthError::TokenGeneration(_)
            | AuthError::Storage(_) => "An internal error occurred".to_string(),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(email) => AuthError::AlreadyExists(email),
            StoreError::NotFound(what) => AuthError::NotFound(what),
            StoreError::InvalidField(field) => AuthError::InvalidField(field),
            StoreError::Exhausted => AuthError::Storage("user id space exhausted".to_string()),
            StoreError::Io(e) => AuthError::Storage(e.to_string()),
            StoreError::Json(e) => AuthError::Storage(e.to_string()),
        }
    }
}
