// ============================
// crates/auth-lib/src/storage/table.rs
// ============================
//! Id-ordered user table shared by the store backends.
use std::collections::BTreeMap;

use user_auth_common::{User, UserId};

use super::{UserFilter, UserUpdate};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub(crate) struct UserTable {
    users: BTreeMap<UserId, User>,
    last_id: UserId,
}

impl UserTable {
    /// Rebuild a table from persisted rows, rejecting duplicate ids, emails or
    /// session tokens
    pub(crate) fn from_users(users: Vec<User>) -> Result<Self, StoreError> {
        let mut table = Self::default();
        for user in users {
            if table.users.contains_key(&user.id) {
                return Err(StoreError::Conflict(format!("duplicate id {}", user.id)));
            }
            if table.email_taken(&user.email, None) {
                return Err(StoreError::Conflict(user.email));
            }
            if let Some(session_id) = &user.session_id {
                if table.session_taken(session_id, None) {
                    return Err(StoreError::Conflict(format!(
                        "duplicate session for id {}",
                        user.id
                    )));
                }
            }
            table.last_id = table.last_id.max(user.id);
            table.users.insert(user.id, user);
        }
        Ok(table)
    }

    pub(crate) fn to_users(&self) -> Vec<User> {
        self.users.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.users.len()
    }

    /// BTreeMap iteration is ascending, so the first match has the lowest id
    pub(crate) fn find(&self, filter: &UserFilter) -> Result<&User, StoreError> {
        self.users
            .values()
            .find(|user| filter.matches(user))
            .ok_or_else(|| StoreError::NotFound(filter.to_string()))
    }

    pub(crate) fn insert(&mut self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        if self.email_taken(email, None) {
            return Err(StoreError::Conflict(email.to_string()));
        }
        let id = self.last_id.checked_add(1).ok_or(StoreError::Exhausted)?;
        self.last_id = id;
        let user = User::new(id, email, hashed_password);
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub(crate) fn update(&mut self, id: UserId, update: &UserUpdate) -> Result<(), StoreError> {
        if !self.users.contains_key(&id) {
            return Err(StoreError::NotFound(format!("id={id}")));
        }
        if let Some(email) = update.new_email() {
            if self.email_taken(email, Some(id)) {
                return Err(StoreError::Conflict(email.to_string()));
            }
        }
        if let Some(session_id) = update.new_session_id() {
            if self.session_taken(session_id, Some(id)) {
                return Err(StoreError::Conflict(format!(
                    "session token already held, id={id}"
                )));
            }
        }
        if let Some(user) = self.users.get_mut(&id) {
            update.apply(user);
        }
        Ok(())
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }

    fn session_taken(&self, session_id: &str, except: Option<UserId>) -> bool {
        self.users.values().any(|user| {
            user.session_id.as_deref() == Some(session_id) && Some(user.id) != except
        })
    }
}
