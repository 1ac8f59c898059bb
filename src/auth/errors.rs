//! # Auth Errors
//!
//! Error types for the authentication module.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Error)]
pub enum AuthError {
    // ==================
    // Access Guard Errors
    // ==================

    /// No usable `Authorization: Bearer <token>` header
    #[error("Token required")]
    MissingCredential,

    /// Bearer token present but rejected by verification
    #[error("Invalid or expired token")]
    InvalidCredential,

    /// Token is valid but its role does not satisfy the operation
    #[error("Admin privileges required")]
    InsufficientPrivilege,

    // ==================
    // Token Errors
    // ==================

    /// Bad signature, malformed structure or expired.
    /// Deliberately a single kind: callers never learn which check failed.
    #[error("Invalid or expired token")]
    InvalidToken,

    // ==================
    // Account Errors
    // ==================

    /// Unknown user or wrong password (generic - don't leak which)
    #[error("Invalid credentials")]
    InvalidLogin,

    /// Username already registered
    #[error("User already exists")]
    UsernameTaken,

    /// Username or password missing from the request
    #[error("username and password are required")]
    MissingFields,

    // ==================
    // Internal Errors
    // ==================

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Token generation failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,

    /// User store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            AuthError::MissingFields => 400,

            // 401 Unauthorized
            AuthError::MissingCredential => 401,
            AuthError::InvalidCredential => 401,
            AuthError::InvalidToken => 401,
            AuthError::InvalidLogin => 401,

            // 403 Forbidden
            AuthError::InsufficientPrivilege => 403,

            // 409 Conflict
            AuthError::UsernameTaken => 409,

            // 500 Internal Server Error
            AuthError::HashingFailed => 500,
            AuthError::TokenGenerationFailed => 500,
            AuthError::Store(e) => e.status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AuthError::MissingCredential.status_code(), 401);
        assert_eq!(AuthError::InvalidCredential.status_code(), 401);
        assert_eq!(AuthError::InsufficientPrivilege.status_code(), 403);
        assert_eq!(AuthError::UsernameTaken.status_code(), 409);
        assert_eq!(AuthError::MissingFields.status_code(), 400);
        assert_eq!(AuthError::HashingFailed.status_code(), 500);
        assert_eq!(AuthError::Store(StoreError::LockPoisoned).status_code(), 500);
    }

    #[test]
    fn test_error_messages_do_not_leak_info() {
        let err = AuthError::InvalidLogin;
        assert!(!err.to_string().contains("password"));
        assert!(!err.to_string().contains("username"));

        // Verification failures read the same whatever the cause
        assert_eq!(
            AuthError::InvalidToken.to_string(),
            AuthError::InvalidCredential.to_string()
        );
    }
}
