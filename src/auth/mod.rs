//! # Auth Module
//!
//! Token-based authentication and authorization.
//!
//! This module provides user accounts, password hashing, JWT bearer
//! tokens, and the access guard applied to protected operations.

pub mod errors;
pub mod crypto;
pub mod user;
pub mod jwt;
pub mod guard;
pub mod api;

pub use api::{AuthService, LoginResponse};
pub use errors::{AuthError, AuthResult};
pub use guard::{AccessGuard, Role};
pub use jwt::{IssuedToken, JwtClaims, JwtConfig, JwtManager};
pub use user::{LoginRequest, RegisterRequest, User, UserResponse};
