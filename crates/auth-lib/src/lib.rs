// ============================
// crates/auth-lib/src/lib.rs
// ============================
//! Core `user-auth` functionality: password hashing, session tokens, user
//! storage and the auth service that ties them together.

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use tracing::info;

use crate::auth::{AuthService, DefaultAuth};
use crate::config::{Settings, StoreBackend};
use crate::error::AuthError;
use crate::storage::{FlatFileUserStore, MemoryUserStore, UserStore};

pub use user_auth_common::{User, UserId};

/// Application state shared by front ends
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// User store backing the service
    pub store: Arc<dyn UserStore>,
    /// Settings in effect
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create application state over an existing store
    pub fn new(store: Arc<dyn UserStore>, settings: Settings) -> Result<Self, AuthError> {
        let auth = Arc::new(DefaultAuth::from_settings(store.clone(), &settings)?);
        Ok(Self {
            auth,
            store,
            settings: Arc::new(settings),
        })
    }

    /// Open the store selected by the settings and build the state around it
    pub fn open(settings: Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn UserStore> = match settings.store.backend {
            StoreBackend::Memory => Arc::new(MemoryUserStore::new()),
            StoreBackend::File => Arc::new(FlatFileUserStore::new(&settings.store.data_dir)?),
        };
        info!(backend = ?settings.store.backend, "user store opened");
        Ok(Self::new(store, settings)?)
    }
}
