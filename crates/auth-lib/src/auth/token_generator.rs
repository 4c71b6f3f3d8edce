// ============================
// crates/auth-lib/src/auth/token_generator.rs
// ============================
/** Session token generation
This module produces the opaque session identifiers handed out by
`create_session`. Tokens carry no user data and are not checked for
uniqueness here; the auth service does that against the store. */
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TokenSettings;

/// Default token size in bytes (32 bytes = 256 bits of entropy)
const DEFAULT_TOKEN_BYTES: usize = 32;

/// Encoding of generated session tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenFormat {
    /// Random UUID v4, hyphenated
    #[default]
    Uuid,
    /// Random bytes, base64 URL-safe without padding
    Random,
}

/// Source of session tokens
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// UUID v4 tokens (122 random bits)
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokenGenerator;

impl TokenGenerator for UuidTokenGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Base64 tokens of a fixed number of random bytes
#[derive(Debug, Clone, Copy)]
pub struct RandomTokenGenerator {
    bytes: usize,
}

impl RandomTokenGenerator {
    pub fn new(bytes: usize) -> Self {
        Self { bytes }
    }
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_BYTES)
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        generate_secure_token_with_size(self.bytes)
    }
}

/// Build the generator selected by the settings
pub fn token_generator_from_settings(settings: &TokenSettings) -> Arc<dyn TokenGenerator> {
    match settings.format {
        TokenFormat::Uuid => Arc::new(UuidTokenGenerator),
        TokenFormat::Random => Arc::new(RandomTokenGenerator::new(settings.bytes)),
    }
}

/** Generate a cryptographically secure random token
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_secure_token() -> String {
    generate_secure_token_with_size(DEFAULT_TOKEN_BYTES)
}

/** Generate a cryptographically secure random token with specified size
# Arguments
* `bytes` - The size of the random token in bytes
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_secure_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}
