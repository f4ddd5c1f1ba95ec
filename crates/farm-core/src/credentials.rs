//! Password hashing and session tokens.
//!
//! Passwords are hashed with Argon2id and stored as PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`), so the parameters
//! travel with each hash.

use std::sync::LazyLock;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;
use rand::distr::Alphanumeric;

pub const SALT_LEN: usize = 16;
pub const SESSION_TOKEN_LEN: usize = 48;

/// Minimum accepted password length for new passwords.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Error type for hashing failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

impl From<argon2::password_hash::Error> for HashError {
    fn from(e: argon2::password_hash::Error) -> Self {
        Self(e.to_string())
    }
}

/// Hashes `password` with a fresh random salt and the default Argon2id
/// parameters.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    hash_password_with(password, &Argon2::default())
}

/// Like [`hash_password`] with explicit parameters.
pub fn hash_password_with(password: &str, argon: &Argon2<'_>) -> Result<String, HashError> {
    let salt_bytes: [u8; SALT_LEN] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes)?;
    Ok(argon.hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Cheap parameters for tests and fixtures.
pub fn fast_hasher() -> Argon2<'static> {
    let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, 1, None)
        .unwrap_or_default();
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Checks `password` against a stored PHC hash. Malformed hashes never
/// verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

static UNKNOWN_USER_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("no such user").unwrap_or_default());

/// Verifies `password` against a throwaway hash and returns false. Used for
/// logins that name no user, so they cost the same as a wrong password.
pub fn reject_unknown_user(password: &str) -> bool {
    verify_password(password, &UNKNOWN_USER_HASH);
    false
}

/// Random alphanumeric bearer token.
pub fn generate_session_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LEN)
        .map(char::from)
        .collect()
}
