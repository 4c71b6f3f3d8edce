// ============================
// crates/auth-lib/src/storage/memory.rs
// ============================
//! In-process user store.
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use user_auth_common::{User, UserId};

use super::table::UserTable;
use super::{UserFilter, UserStore, UserUpdate};
use crate::error::StoreError;

/// Volatile store; check-and-insert runs under one write guard
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    table: RwLock<UserTable>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_user_by(&self, filter: &UserFilter) -> Result<User, StoreError> {
        self.table.read().find(filter).cloned()
    }

    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        let user = self.table.write().insert(email, hashed_password)?;
        debug!(user_id = user.id, "user added to memory store");
        Ok(user)
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<(), StoreError> {
        self.table.write().update(id, update)
    }
}
