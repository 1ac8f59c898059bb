//! # Password Hashing
//!
//! Passwords are stored only as Argon2id PHC strings. A stored credential
//! that is not a PHC string (legacy value, or the unusable placeholder)
//! never verifies.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::errors::{AuthError, AuthResult};

/// Stored credential of an account that cannot log in
pub const UNUSABLE_CREDENTIAL: &str = "";

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::HashingFailed)
}

/// Verify a password against a stored credential.
///
/// Uses constant-time comparison internally (via argon2 crate).
pub fn verify_password(password: &str, credential: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(credential) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
