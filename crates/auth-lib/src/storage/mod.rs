// ============================
// crates/auth-lib/src/storage/mod.rs
// ============================
//! User store abstraction with in-memory and flat-file implementations.
//!
//! Backends compare field values exactly; email normalization happens in the
//! auth service before anything reaches the store. When a filter matches
//! several users the one with the lowest id is returned.
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use user_auth_common::{User, UserId};

use crate::error::StoreError;

mod flat_file;
mod memory;
mod table;

pub use flat_file::{FlatFileUserStore, USERS_FILE};
pub use memory::MemoryUserStore;

/// Trait for user store backends
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the lowest-id user matching every predicate in `filter`
    async fn find_user_by(&self, filter: &UserFilter) -> Result<User, StoreError>;

    /// Insert a user, failing with `Conflict` if the email is taken
    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError>;

    /// Apply a partial update to the user with `id`.
    ///
    /// Fails with `Conflict` if the new email or session token is held by
    /// another user; the check and the write are one atomic step.
    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<(), StoreError>;
}

/// Columns of the user record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Id,
    Email,
    HashedPassword,
    SessionId,
}

impl UserField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::Email => "email",
            UserField::HashedPassword => "hashed_password",
            UserField::SessionId => "session_id",
        }
    }
}

impl FromStr for UserField {
    type Err = StoreError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "id" => Ok(UserField::Id),
            "email" => Ok(UserField::Email),
            "hashed_password" => Ok(UserField::HashedPassword),
            "session_id" => Ok(UserField::SessionId),
            other => Err(StoreError::InvalidField(other.to_string())),
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conjunction of equality predicates on user fields.
///
/// An empty filter matches every user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    id: Option<UserId>,
    email: Option<String>,
    hashed_password: Option<String>,
    session_id: Option<String>,
}

impl UserFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: UserId) -> Self {
        Self::new().id(id)
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self::new().email(email)
    }

    pub fn by_session_id(session_id: impl Into<String>) -> Self {
        Self::new().session_id(session_id)
    }

    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn hashed_password(mut self, hashed_password: impl Into<String>) -> Self {
        self.hashed_password = Some(hashed_password.into());
        self
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Build a filter from `(field name, value)` pairs.
    ///
    /// Unknown names, and ids that are not integers, fail with `InvalidField`.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .try_fold(Self::new(), |filter, (name, value)| -> Result<Self, StoreError> {
                Ok(match name.parse::<UserField>()? {
                    UserField::Id => filter.id(parse_id(value)?),
                    UserField::Email => filter.email(value),
                    UserField::HashedPassword => filter.hashed_password(value),
                    UserField::SessionId => filter.session_id(value),
                })
            })
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether `user` satisfies every predicate
    pub fn matches(&self, user: &User) -> bool {
        self.id.map_or(true, |id| user.id == id)
            && self.email.as_deref().map_or(true, |e| user.email == e)
            && self
                .hashed_password
                .as_deref()
                .map_or(true, |h| user.hashed_password == h)
            && self
                .session_id
                .as_deref()
                .map_or(true, |s| user.session_id.as_deref() == Some(s))
    }
}

// Secret-bearing values are never rendered.
impl fmt::Display for UserFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(id) = self.id {
            parts.push(format!("id={id}"));
        }
        if let Some(email) = &self.email {
            parts.push(format!("email={email}"));
        }
        if self.hashed_password.is_some() {
            parts.push("hashed_password=<redacted>".to_string());
        }
        if self.session_id.is_some() {
            parts.push("session_id=<redacted>".to_string());
        }
        if parts.is_empty() {
            f.write_str("<any>")
        } else {
            f.write_str(&parts.join(","))
        }
    }
}

/// Partial update of a user record. `id` cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    email: Option<String>,
    hashed_password: Option<String>,
    session_id: Option<Option<String>>,
}

impl UserUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn hashed_password(mut self, hashed_password: impl Into<String>) -> Self {
        self.hashed_password = Some(hashed_password.into());
        self
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(Some(session_id.into()));
        self
    }

    pub fn clear_session(mut self) -> Self {
        self.session_id = Some(None);
        self
    }

    /// Build an update from `(field name, value)` pairs.
    ///
    /// Unknown names and `id` fail with `InvalidField`.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .try_fold(Self::new(), |update, (name, value)| -> Result<Self, StoreError> {
                Ok(match name.parse::<UserField>()? {
                    UserField::Id => {
                        return Err(StoreError::InvalidField(
                            "id (immutable)".to_string(),
                        ))
                    }
                    UserField::Email => update.email(value),
                    UserField::HashedPassword => update.hashed_password(value),
                    UserField::SessionId => update.session_id(value),
                })
            })
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// New email, if this update changes it
    pub fn new_email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// New session token, if this update sets one
    pub fn new_session_id(&self) -> Option<&str> {
        self.session_id.as_ref().and_then(|s| s.as_deref())
    }

    /// Write the changed fields into `user`
    pub fn apply(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(hashed_password) = &self.hashed_password {
            user.hashed_password = hashed_password.clone();
        }
        if let Some(session_id) = &self.session_id {
            user.session_id = session_id.clone();
        }
    }
}

fn parse_id(value: &str) -> Result<UserId, StoreError> {
    value
        .parse()
        .map_err(|_| StoreError::InvalidField(format!("id={value}")))
}
