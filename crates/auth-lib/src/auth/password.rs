// ============================
// crates/auth-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
//!
//! Hashes are PHC strings (`$scrypt$ln=17,r=8,p=1$<salt>$<hash>`) so the salt
//! and cost parameters travel with the secret and verification needs nothing
//! else. New hashes use the configured algorithm; verification accepts any
//! supported algorithm so the setting can change without locking users out.
use argon2::{Algorithm, Argon2, Version};
use rand::RngCore;
use scrypt::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Scrypt,
};
use serde::{Deserialize, Serialize};

use crate::config::HasherSettings;
use crate::error::AuthError;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// Random salt size in bytes
const SALT_LEN: usize = 16;

const SCRYPT_IDENT: &str = "scrypt";
const ARGON2ID_IDENT: &str = "argon2id";

/// Algorithm used for newly created hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Scrypt,
    Argon2id,
}

/// Password complexity requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordRequirements {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

/// Salted, adaptive-cost password hasher
#[derive(Clone)]
pub struct CredentialHasher {
    algorithm: HashAlgorithm,
    scrypt_params: scrypt::Params,
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Build a hasher, rejecting cost parameters the algorithms refuse
    pub fn new(settings: &HasherSettings) -> Result<Self, AuthError> {
        let scrypt_params = scrypt::Params::new(
            settings.scrypt_log_n,
            settings.scrypt_r,
            settings.scrypt_p,
            scrypt::Params::RECOMMENDED_LEN,
        )
        .map_err(|e| AuthError::Hashing(format!("scrypt parameters: {e}")))?;

        let argon2_params = argon2::Params::new(
            settings.argon2_m_cost,
            settings.argon2_t_cost,
            settings.argon2_p_cost,
            None,
        )
        .map_err(|e| AuthError::Hashing(format!("argon2 parameters: {e}")))?;

        Ok(Self {
            algorithm: settings.algorithm,
            scrypt_params,
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params),
        })
    }

    /// Algorithm used by [`CredentialHasher::hash`]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plain: &str) -> Result<String, AuthError> {
        let salt = generate_salt()?;
        let hash = match self.algorithm {
            HashAlgorithm::Scrypt => Scrypt.hash_password_customized(
                plain.as_bytes(),
                None,
                None,
                self.scrypt_params,
                &salt,
            ),
            HashAlgorithm::Argon2id => self.argon2.hash_password(plain.as_bytes(), &salt),
        }
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// A wrong password is `Ok(false)`. A secret that cannot be parsed, or that
    /// names an unsupported algorithm, is `Err(AuthError::MalformedSecret)`.
    pub fn verify(&self, plain: &str, secret: &str) -> Result<bool, AuthError> {
        let parsed =
            PasswordHash::new(secret).map_err(|e| AuthError::MalformedSecret(e.to_string()))?;
        if parsed.salt.is_none() || parsed.hash.is_none() {
            return Err(AuthError::MalformedSecret(
                "missing salt or hash output".to_string(),
            ));
        }

        let outcome = match parsed.algorithm.as_str() {
            SCRYPT_IDENT => Scrypt.verify_password(plain.as_bytes(), &parsed),
            ARGON2ID_IDENT => self.argon2.verify_password(plain.as_bytes(), &parsed),
            other => {
                return Err(AuthError::MalformedSecret(format!(
                    "unsupported algorithm `{other}`"
                )))
            }
        };

        match outcome {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::MalformedSecret(e.to_string())),
        }
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Scrypt,
            scrypt_params: scrypt::Params::recommended(),
            argon2: Argon2::default(),
        }
    }
}

fn generate_salt() -> Result<SaltString, AuthError> {
    let mut bytes = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut bytes);
    SaltString::encode_b64(&bytes).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check if a password meets the complexity requirements
pub fn validate_password_strength(password: &str, requirements: &PasswordRequirements) -> bool {
    if password.chars().count() < requirements.min_length {
        return false;
    }

    if requirements.require_uppercase && !password.chars().any(char::is_uppercase) {
        return false;
    }

    if requirements.require_lowercase && !password.chars().any(char::is_lowercase) {
        return false;
    }

    if requirements.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    if requirements.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
        return false;
    }

    true
}
