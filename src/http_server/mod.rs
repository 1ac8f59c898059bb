//! # HTTP Server Module
//!
//! The JSON API over the product and user stores, combined into one Axum
//! server.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/auth/*` - Registration, login and user administration
//! - `/api/products/*` - Product CRUD
//! - `/api/reports/*` - Stock reports

pub mod auth_routes;
pub mod config;
pub mod errors;
pub mod health_routes;
pub mod product_routes;
pub mod report_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::{HttpServer, Services};
