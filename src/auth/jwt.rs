//! # JWT Token Management
//!
//! JSON Web Token issuance and verification.
//!
//! ## Invariants
//! - Stateless validation (no store lookup, no revocation list)
//! - A token is rejected at or after its `exp` second
//! - Every verification failure is reported as the same error kind
//! - No secrets in token

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};
use super::user::User;
use crate::store::RecordId;

/// Signing secret used when none is configured. Never use in production.
pub const INSECURE_DEFAULT_SECRET: &str = "dev-secret-CHANGE-ME";

/// JWT claims for access tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtClaims {
    /// Subject (user id, as a decimal string)
    pub sub: String,

    pub username: String,

    /// Role flag; tokens minted without it are non-admin
    #[serde(default)]
    pub is_admin: bool,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,
}

impl JwtClaims {
    /// The subject as a record id
    pub fn subject_id(&self) -> Option<RecordId> {
        self.sub.parse().ok()
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing
    pub secret: String,

    /// Token lifetime
    pub token_ttl: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: INSECURE_DEFAULT_SECRET.to_string(),
            token_ttl: Duration::hours(4),
        }
    }
}

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: JwtClaims,
}

/// JWT manager for token issuance and verification
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    /// Create a new JWT manager with the given configuration
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Whether the manager signs with [`INSECURE_DEFAULT_SECRET`]
    pub fn uses_insecure_default(&self) -> bool {
        self.config.secret == INSECURE_DEFAULT_SECRET
    }

    pub fn token_ttl(&self) -> Duration {
        self.config.token_ttl
    }

    /// Issue a token for `user` with the configured lifetime
    pub fn issue(&self, user: &User) -> AuthResult<IssuedToken> {
        self.issue_with_ttl(user, self.config.token_ttl)
    }

    /// Issue a token for `user` expiring `ttl` from now
    pub fn issue_with_ttl(&self, user: &User, ttl: Duration) -> AuthResult<IssuedToken> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenGenerationFailed)?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify a token's signature and expiry and return its claims
    pub fn verify(&self, token: &str) -> AuthResult<JwtClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::InvalidToken)?
            .claims;

        if claims.exp <= Utc::now().timestamp() || claims.subject_id().is_none() {
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}
