// ============================
// crates/auth-lib/src/storage/flat_file.rs
// ============================
//! Flat-file user store.
//!
//! Users live in `<root>/users.json` as a pretty-printed JSON array. Every
//! operation holds the store mutex for its whole read-modify-write, and writes
//! go to a temp file that is renamed over the original, so readers never see a
//! half-written file.
use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs as tokio_fs, sync::Mutex};
use tracing::debug;
use user_auth_common::{User, UserId};

use super::table::UserTable;
use super::{UserFilter, UserStore, UserUpdate};
use crate::error::StoreError;

/// File name of the user table inside the data directory
pub const USERS_FILE: &str = "users.json";

/// Flat-file implementation of the UserStore trait
#[derive(Debug)]
pub struct FlatFileUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FlatFileUserStore {
    /// Open (creating if needed) the store under `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;

        let path = root.join(USERS_FILE);
        if !path.exists() {
            fs::write(&path, "[]")?;
        } else {
            // Reject a corrupt or inconsistent file at open
            let content = fs::read_to_string(&path)?;
            UserTable::from_users(serde_json::from_str(&content)?)?;
        }

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Path of the backing JSON file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<UserTable, StoreError> {
        let content = tokio_fs::read_to_string(&self.path).await?;
        let users: Vec<User> = serde_json::from_str(&content)?;
        UserTable::from_users(users)
    }

    async fn save(&self, table: &UserTable) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&table.to_users())?;
        let tmp = self.path.with_extension("json.tmp");
        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for FlatFileUserStore {
    async fn find_user_by(&self, filter: &UserFilter) -> Result<User, StoreError> {
        let _guard = self.lock.lock().await;
        let table = self.load().await?;
        table.find(filter).cloned()
    }

    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        let _guard = self.lock.lock().await;
        let mut table = self.load().await?;
        let user = table.insert(email, hashed_password)?;
        self.save(&table).await?;

        debug!(user_id = user.id, path = %self.path.display(), "user added to flat-file store");
        Ok(user)
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut table = self.load().await?;
        table.update(id, update)?;
        self.save(&table).await
    }
}
