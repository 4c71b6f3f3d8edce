// ============================
// crates/auth-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
pub mod token_generator;
mod service;
mod service_impl;

pub use password::{
    validate_password_strength, CredentialHasher, HashAlgorithm, PasswordRequirements,
    MIN_PASSWORD_LENGTH,
};
pub use service::AuthService;
pub use service_impl::{DefaultAuth, MAX_TOKEN_ATTEMPTS};
pub use token_generator::{
    generate_secure_token, generate_secure_token_with_size, token_generator_from_settings,
    RandomTokenGenerator, TokenFormat, TokenGenerator, UuidTokenGenerator,
};
