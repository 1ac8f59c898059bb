//! HTTP error mapping
//!
//! Every handler returns [`ApiResult`]; errors render as
//! `{"error": <message>, "code": <status>}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::store::{RecordId, StoreError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Auth(e) => e.status_code(),
            ApiError::Store(e) => e.status_code(),
            ApiError::NotFound => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Conflict(_) => 409,
            ApiError::Task(_) => 500,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { error: message, code })).into_response()
    }
}

/// Run `work` on the blocking pool. Password hashing and fsync'd snapshot
/// writes go through here instead of occupying an async worker.
pub async fn run_blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

/// Parse a record id from a path segment; anything unparseable is a miss
pub fn parse_id(raw: &str) -> ApiResult<RecordId> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NotFound.status_code(), 404);
        assert_eq!(ApiError::Conflict("dup".into()).status_code(), 409);
        assert_eq!(ApiError::from(AuthError::MissingCredential).status_code(), 401);
        assert_eq!(ApiError::from(StoreError::LockPoisoned).status_code(), 500);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(matches!(parse_id("invalid"), Err(ApiError::NotFound)));
        assert!(matches!(parse_id("-1"), Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn test_run_blocking_returns_work_result() {
        assert_eq!(run_blocking(|| Ok(7)).await.unwrap(), 7);
        assert!(matches!(
            run_blocking::<(), _>(|| Err(ApiError::NotFound)).await,
            Err(ApiError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_run_blocking_panic_is_internal_error() {
        let err = run_blocking::<(), _>(|| panic!("worker died")).await.unwrap_err();
        assert!(matches!(err, ApiError::Task(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_server_errors_hide_details() {
        let response = ApiError::from(StoreError::LockPoisoned).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
