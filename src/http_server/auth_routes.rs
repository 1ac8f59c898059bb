//! Auth HTTP Routes
//!
//! Registration, login and user listing on top of [`AuthService`].

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};

use super::errors::{parse_id, run_blocking, ApiError, ApiResult};
use crate::auth::{
    AccessGuard, AuthService, JwtClaims, LoginRequest, LoginResponse, RegisterRequest, Role,
    UserResponse,
};

/// Shared auth state
pub struct AuthState {
    pub service: AuthService,
    pub guard: AccessGuard,
}

impl AuthState {
    pub fn new(service: AuthService, guard: AccessGuard) -> Self {
        Self { service, guard }
    }
}

/// Auth routes with shared state
pub fn auth_routes(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/me", get(me_handler))
        .route("/users", get(list_users_handler))
        .route("/users/:id", delete(delete_user_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

/// Register handler. An admin caller may create admin accounts.
async fn register_handler(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let Json(request) = payload?;
    let grant_admin = state.guard.require(&headers, Role::Admin).is_ok();

    let user = run_blocking(move || Ok(state.service.register(request, grant_admin)?)).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Login handler
async fn login_handler(
    State(state): State<Arc<AuthState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;

    let (_, issued) = run_blocking(move || Ok(state.service.login(request)?)).await?;
    Ok(Json(LoginResponse::from(issued)))
}

/// Claims of the calling token
async fn me_handler(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
) -> ApiResult<Json<JwtClaims>> {
    Ok(Json(state.guard.authenticate(&headers)?))
}

/// List all users (any authenticated user)
async fn list_users_handler(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<UserResponse>>> {
    state.guard.require(&headers, Role::User)?;
    Ok(Json(state.service.list_users()?))
}

/// Delete a user (admin only)
async fn delete_user_handler(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.guard.require(&headers, Role::Admin)?;
    let id = parse_id(&id)?;

    if run_blocking(move || Ok(state.service.delete_user(id)?)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
