// ============================
// crates/auth-lib/src/config.rs
// ============================
//! Configuration management.
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::{CredentialHasher, HashAlgorithm, PasswordRequirements, TokenFormat};


/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "user-auth.toml";

/// Prefix for environment overrides, e.g. `USER_AUTH_HASHER__SCRYPT_LOG_N=12`
pub const ENV_PREFIX: &str = "USER_AUTH_";

/// Smallest accepted random token, in bytes (128 bits)
pub const MIN_TOKEN_BYTES: usize = 16;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// User store backend
    pub store: StoreSettings,
    /// Password hashing parameters
    pub hasher: HasherSettings,
    /// Session token format
    pub token: TokenSettings,
    /// Password policy applied at registration; none when absent
    pub password_requirements: Option<PasswordRequirements>,
}

/// Which user store to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
}

/// User store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Backend kind
    pub backend: StoreBackend,
    /// Directory holding `users.json` for the file backend
    pub data_dir: PathBuf,
}

/// Password hashing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherSettings {
    /// Algorithm used for new hashes
    pub algorithm: HashAlgorithm,
    /// scrypt CPU/memory cost as log2(N)
    pub scrypt_log_n: u8,
    /// scrypt block size
    pub scrypt_r: u32,
    /// scrypt parallelism
    pub scrypt_p: u32,
    /// argon2 memory cost in KiB
    pub argon2_m_cost: u32,
    /// argon2 iterations
    pub argon2_t_cost: u32,
    /// argon2 lanes
    pub argon2_p_cost: u32,
}

/// Session token settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenSettings {
    /// Token encoding
    pub format: TokenFormat,
    /// Entropy in bytes for the `random` format
    pub bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            store: StoreSettings::default(),
            hasher: HasherSettings::default(),
            token: TokenSettings::default(),
            password_requirements: None,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Default for HasherSettings {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Scrypt,
            scrypt_log_n: scrypt::Params::RECOMMENDED_LOG_N,
            scrypt_r: scrypt::Params::RECOMMENDED_R,
            scrypt_p: scrypt::Params::RECOMMENDED_P,
            argon2_m_cost: argon2::Params::DEFAULT_M_COST,
            argon2_t_cost: argon2::Params::DEFAULT_T_COST,
            argon2_p_cost: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl HasherSettings {
    /// Cheap parameters for tests and local development. Never use in production.
    pub fn low_cost() -> Self {
        Self {
            algorithm: HashAlgorithm::Scrypt,
            scrypt_log_n: 4,
            scrypt_r: 8,
            scrypt_p: 1,
            argon2_m_cost: 64,
            argon2_t_cost: 1,
            argon2_p_cost: 1,
        }
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            format: TokenFormat::Uuid,
            bytes: 32,
        }
    }
}

impl Settings {
    /// Load settings from `user-auth.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::extract(Self::base().merge(Toml::file(DEFAULT_CONFIG_FILE)))
    }

    /// Load settings from an explicit TOML file, then the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        Self::extract(Self::base().merge(Toml::file(path)))
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let settings: Settings = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings for values the library would reject at runtime
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            bail!(
                "invalid log level `{}`, expected one of {:?}",
                self.log_level,
                LOG_LEVELS
            );
        }

        if let Err(e) = CredentialHasher::new(&self.hasher) {
            bail!("invalid hasher settings: {e}");
        }

        if self.token.format == TokenFormat::Random && self.token.bytes < MIN_TOKEN_BYTES {
            bail!(
                "random session tokens need at least {MIN_TOKEN_BYTES} bytes, got {}",
                self.token.bytes
            );
        }

        if let Some(req) = &self.password_requirements {
            if req.min_length == 0 {
                bail!("password min_length must be at least 1");
            }
        }

        Ok(())
    }
}
