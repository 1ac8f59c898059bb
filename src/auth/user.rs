//! # User Management
//!
//! The user record kind and username lookups on the user store.

use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::crypto::{hash_password, verify_password, UNUSABLE_CREDENTIAL};
use crate::store::seed::{string_field, truthy};
use crate::store::{Normalize, Record, RecordId, RecordStore, StoreError, StoreResult};

/// User model as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    pub id: RecordId,

    /// Login name (unique, case-sensitive)
    pub username: String,

    /// Argon2id PHC string, or [`UNUSABLE_CREDENTIAL`]
    #[serde(default)]
    pub credential: String,

    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    /// Verify a password against this user's stored credential
    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(password, &self.credential)
    }

    /// Whether this account can log in at all
    pub fn has_usable_credential(&self) -> bool {
        self.credential != UNUSABLE_CREDENTIAL
    }
}

/// Fields of a new user; `credential` is already hashed
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub username: String,
    pub credential: String,
    pub is_admin: bool,
}

impl Record for User {
    type Draft = UserDraft;
    /// Users are created and deleted, never edited
    type Patch = Infallible;
    const KIND: &'static str = "users";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: UserDraft) -> Self {
        Self {
            id,
            username: draft.username,
            credential: draft.credential,
            is_admin: draft.is_admin,
        }
    }

    fn apply(&mut self, patch: Infallible) {
        match patch {}
    }
}

/// An existing `credential` is kept as is. Otherwise a plaintext
/// `password` is hashed here, and an entry with only a pre-hashed
/// `passwordHash` (scheme unknown) gets the unusable placeholder.
impl Normalize for User {
    fn normalize(id: RecordId, entry: &Map<String, Value>) -> StoreResult<Option<Self>> {
        let Some(username) = string_field(entry, "username") else {
            return Ok(None);
        };

        let credential = match (string_field(entry, "credential"), string_field(entry, "password")) {
            (Some(credential), _) => credential,
            (None, Some(password)) => hash_password(&password)
                .map_err(|e| StoreError::Normalization(format!("user {}: {}", username, e)))?,
            (None, None) => UNUSABLE_CREDENTIAL.to_string(),
        };

        let is_admin = truthy(entry.get("isAdmin").or_else(|| entry.get("is_admin")));

        Ok(Some(User {
            id,
            username,
            credential,
            is_admin,
        }))
    }
}

impl RecordStore<User> {
    /// First user with exactly this username (no case folding)
    pub fn get_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.find_first(|u| u.username == username)
    }
}

/// User as exposed over the API; never carries the credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: RecordId,
    pub username: String,
    pub is_admin: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Registration request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: Option<Value>,
}

/// Login request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}
