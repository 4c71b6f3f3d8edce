// ============================
// crates/auth-lib/src/auth/service_impl.rs
// ============================
//! Default `AuthService` over an injected user store.
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task;
use tracing::{debug, info, warn};
use user_auth_common::User;
use zeroize::Zeroizing;

use super::{
    token_generator_from_settings, validate_password_strength, AuthService, CredentialHasher,
    PasswordRequirements, TokenGenerator, UuidTokenGenerator,
};
use crate::config::Settings;
use crate::error::{AuthError, StoreError};
use crate::metrics;
use crate::storage::{UserFilter, UserStore, UserUpdate};
use crate::validation::normalize_email;

/// Fresh tokens tried before `create_session` gives up
pub const MAX_TOKEN_ATTEMPTS: usize = 3;

pub struct DefaultAuth {
    store: Arc<dyn UserStore>,
    hasher: Arc<CredentialHasher>,
    tokens: Arc<dyn TokenGenerator>,
    password_requirements: Option<PasswordRequirements>,
}

impl DefaultAuth {
    /// Auth service with the default hasher, UUID tokens and no password policy
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            hasher: Arc::new(CredentialHasher::default()),
            tokens: Arc::new(UuidTokenGenerator),
            password_requirements: None,
        }
    }

    /// Auth service configured from `settings`
    pub fn from_settings(store: Arc<dyn UserStore>, settings: &Settings) -> Result<Self, AuthError> {
        Ok(Self {
            store,
            hasher: Arc::new(CredentialHasher::new(&settings.hasher)?),
            tokens: token_generator_from_settings(&settings.token),
            password_requirements: settings.password_requirements.clone(),
        })
    }

    pub fn with_hasher(mut self, hasher: CredentialHasher) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_password_requirements(mut self, requirements: PasswordRequirements) -> Self {
        self.password_requirements = Some(requirements);
        self
    }

    /// Store lookup where "no such user" is a value, not an error
    async fn find_optional(&self, filter: &UserFilter) -> Result<Option<User>, AuthError> {
        match self.store.find_user_by(filter).await {
            Ok(user) => Ok(Some(user)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Hash on the blocking pool; scrypt and argon2 are memory-hard
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let password = Zeroizing::new(password.to_owned());
        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: &str, secret: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = Zeroizing::new(password.to_owned());
        let secret = secret.to_owned();
        task::spawn_blocking(move || hasher.verify(&password, &secret))
            .await
            .map_err(|e| AuthError::Hashing(format!("verification task failed: {e}")))?
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn register_user(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email).map_err(|e| AuthError::InvalidEmail(e.to_string()))?;

        if let Some(requirements) = &self.password_requirements {
            if !validate_password_strength(password, requirements) {
                return Err(AuthError::WeakPassword);
            }
        }

        if self.find_optional(&UserFilter::by_email(email.as_str())).await?.is_some() {
            metrics::increment(metrics::REGISTER_CONFLICT);
            info!(%email, "registration rejected, user exists");
            return Err(AuthError::AlreadyExists(email));
        }

        let hashed_password = self.hash_password(password).await?;
        let user = match self.store.add_user(&email, &hashed_password).await {
            Ok(user) => user,
            // Lost a race with a concurrent registration
            Err(StoreError::Conflict(_)) => {
                metrics::increment(metrics::REGISTER_CONFLICT);
                info!(%email, "registration rejected by store, user exists");
                return Err(AuthError::AlreadyExists(email));
            }
            Err(e) => return Err(e.into()),
        };

        metrics::increment(metrics::REGISTER_SUCCESS);
        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(user)
    }

    async fn valid_login(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let Ok(email) = normalize_email(email) else {
            metrics::increment(metrics::LOGIN_FAILURE);
            return Ok(false);
        };

        let Some(user) = self.find_optional(&UserFilter::by_email(email)).await? else {
            metrics::increment(metrics::LOGIN_FAILURE);
            debug!("login rejected");
            return Ok(false);
        };

        let valid = self.verify_password(password, &user.hashed_password).await?;
        if valid {
            metrics::increment(metrics::LOGIN_SUCCESS);
        } else {
            metrics::increment(metrics::LOGIN_FAILURE);
        }
        debug!(user_id = user.id, valid, "login checked");
        Ok(valid)
    }

    async fn create_session(&self, email: &str) -> Result<String, AuthError> {
        let email =
            normalize_email(email).map_err(|_| AuthError::NotFound(email.trim().to_string()))?;

        let user = self
            .find_optional(&UserFilter::by_email(email.as_str()))
            .await?
            .ok_or_else(|| AuthError::NotFound(email.clone()))?;

        // The store checks token uniqueness and writes under one guard
        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let token = self.tokens.generate();
            if token.is_empty() {
                return Err(AuthError::TokenGeneration("empty token".to_string()));
            }

            let update = UserUpdate::new().session_id(token.as_str());
            match self.store.update_user(user.id, &update).await {
                Ok(()) => {
                    metrics::increment(metrics::SESSION_CREATED);
                    info!(user_id = user.id, "session created");
                    return Ok(token);
                }
                Err(StoreError::Conflict(_)) => {
                    metrics::increment(metrics::SESSION_TOKEN_COLLISION);
                    warn!(attempt, user_id = user.id, "session token collision, regenerating");
                }
                Err(StoreError::NotFound(_)) => return Err(AuthError::NotFound(email)),
                Err(e) => return Err(e.into()),
            }
        }

        Err(AuthError::TokenCollision(MAX_TOKEN_ATTEMPTS))
    }

    async fn get_user_from_session_id(&self, session_id: &str) -> Result<Option<User>, AuthError> {
        if session_id.is_empty() {
            return Ok(None);
        }
        self.find_optional(&UserFilter::by_session_id(session_id)).await
    }
}
