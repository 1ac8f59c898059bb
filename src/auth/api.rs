//! # Auth Service
//!
//! Registration, login and user administration over the user store.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::crypto::hash_password;
use super::errors::{AuthError, AuthResult};
use super::jwt::{IssuedToken, JwtManager};
use super::user::{LoginRequest, RegisterRequest, User, UserDraft, UserResponse};
use crate::store::seed::truthy;
use crate::store::{RecordId, RecordStore, StoreError};

/// Auth service combining the user store and the token issuer
pub struct AuthService {
    users: Arc<RecordStore<User>>,
    jwt: Arc<JwtManager>,
    /// Serializes the username check with the insert that follows it
    registration: Mutex<()>,
}

impl AuthService {
    pub fn new(users: Arc<RecordStore<User>>, jwt: Arc<JwtManager>) -> Self {
        Self {
            users,
            jwt,
            registration: Mutex::new(()),
        }
    }

    pub fn users(&self) -> &RecordStore<User> {
        &self.users
    }

    /// Register a new user.
    ///
    /// A requested admin flag is only honored when `grant_admin` is set,
    /// i.e. when the caller is itself an authenticated admin.
    pub fn register(&self, request: RegisterRequest, grant_admin: bool) -> AuthResult<User> {
        let username = non_empty(request.username).ok_or(AuthError::MissingFields)?;
        let password = non_empty(request.password).ok_or(AuthError::MissingFields)?;
        let is_admin = grant_admin && truthy(request.is_admin.as_ref());

        let _guard = self
            .registration
            .lock()
            .map_err(|_| AuthError::Store(StoreError::LockPoisoned))?;

        if self.users.get_by_username(&username)?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let user = self.users.create(UserDraft {
            username,
            credential: hash_password(&password)?,
            is_admin,
        })?;

        info!(user_id = user.id, is_admin = user.is_admin, "user registered");
        Ok(user)
    }

    /// Authenticate a user and issue a token
    pub fn login(&self, request: LoginRequest) -> AuthResult<(User, IssuedToken)> {
        let username = non_empty(request.username).ok_or(AuthError::MissingFields)?;
        let password = non_empty(request.password).ok_or(AuthError::MissingFields)?;

        let Some(user) = self.users.get_by_username(&username)? else {
            debug!("login rejected: unknown user");
            return Err(AuthError::InvalidLogin);
        };

        if !user.verify_password(&password) {
            debug!(user_id = user.id, "login rejected: credential mismatch");
            return Err(AuthError::InvalidLogin);
        }

        let token = self.jwt.issue(&user)?;
        Ok((user, token))
    }

    /// All users, without credentials
    pub fn list_users(&self) -> AuthResult<Vec<UserResponse>> {
        Ok(self.users.list()?.iter().map(UserResponse::from).collect())
    }

    /// Delete a user; `Ok(false)` if there was none
    pub fn delete_user(&self, id: RecordId) -> AuthResult<bool> {
        Ok(self.users.remove(id)?)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

// ==================
// HTTP Request/Response Types
// ==================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub is_admin: bool,
    /// Expiry, Unix epoch seconds
    pub expires_at: i64,
}

impl From<IssuedToken> for LoginResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            is_admin: issued.claims.is_admin,
            expires_at: issued.claims.exp,
            token: issued.token,
        }
    }
}
