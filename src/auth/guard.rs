//! # Access Guard
//!
//! The per-request check chain in front of protected operations:
//!
//! ```text
//! Unauthenticated --authenticate--> Authenticated --authorize--> Authorized
//!        |                                |
//!        +-> MissingCredential            +-> InsufficientPrivilege
//!        +-> InvalidCredential
//! ```
//!
//! The first failure is terminal. Nothing is carried between requests.

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtClaims, JwtManager};

const BEARER_PREFIX: &str = "Bearer ";

/// Privilege tier an operation requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Any authenticated user
    User,
    /// Users whose token carries the admin flag
    Admin,
}

impl Role {
    /// Whether verified `claims` satisfy this role
    pub fn is_satisfied_by(self, claims: &JwtClaims) -> bool {
        match self {
            Role::User => true,
            Role::Admin => claims.is_admin,
        }
    }
}

/// Authentication + authorization checks, backed by the token verifier
#[derive(Clone)]
pub struct AccessGuard {
    jwt: Arc<JwtManager>,
}

impl AccessGuard {
    pub fn new(jwt: Arc<JwtManager>) -> Self {
        Self { jwt }
    }

    /// Authenticate a request from its headers and return the verified claims.
    ///
    /// The header must read exactly `Bearer <token>` with a non-empty token;
    /// anything else is `MissingCredential`. A token that fails
    /// verification for any reason is `InvalidCredential`.
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthResult<JwtClaims> {
        let token = extract_bearer_token(headers).ok_or(AuthError::MissingCredential)?;

        self.jwt
            .verify(token)
            .map_err(|_| AuthError::InvalidCredential)
    }

    /// Check that verified claims satisfy `required`
    pub fn authorize(&self, claims: &JwtClaims, required: Role) -> AuthResult<()> {
        if required.is_satisfied_by(claims) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPrivilege)
        }
    }

    /// Authenticate, then authorize for `required`
    pub fn require(&self, headers: &HeaderMap, required: Role) -> AuthResult<JwtClaims> {
        let claims = self.authenticate(headers)?;
        self.authorize(&claims, required)?;
        Ok(claims)
    }
}

/// Extract a non-empty bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
}
