//! # HTTP Server
//!
//! Main HTTP server combining all endpoint routers.

use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::auth_routes::{auth_routes, AuthState};
use super::config::HttpServerConfig;
use super::health_routes::health_routes;
use super::product_routes::{product_routes, InventoryState};
use super::report_routes::report_routes;
use crate::auth::{AccessGuard, AuthService, JwtManager, User};
use crate::config::ServiceConfig;
use crate::inventory::Product;
use crate::store::{RecordStore, StoreError, StoreResult};

/// The stores and token manager shared by every route
#[derive(Clone)]
pub struct Services {
    pub products: Arc<RecordStore<Product>>,
    pub users: Arc<RecordStore<User>>,
    pub jwt: Arc<JwtManager>,
}

impl Services {
    /// Open both stores under the configured data directory
    pub fn open(config: &ServiceConfig) -> StoreResult<Self> {
        let storage = &config.storage;
        fs::create_dir_all(&storage.data_dir)
            .map_err(|source| StoreError::persistence(storage.data_dir.clone(), source))?;

        let products =
            RecordStore::load_or_initialize(storage.products_path(), storage.products_seed_path())?;
        let users = RecordStore::load_or_initialize(storage.users_path(), storage.users_seed_path())?;

        let jwt = JwtManager::new(config.auth.jwt_config());
        if jwt.uses_insecure_default() {
            warn!("JWT_SECRET is not set; tokens are signed with the development default");
        }

        Ok(Self::from_parts(products, users, jwt))
    }

    pub fn from_parts(
        products: RecordStore<Product>,
        users: RecordStore<User>,
        jwt: JwtManager,
    ) -> Self {
        Self {
            products: Arc::new(products),
            users: Arc::new(users),
            jwt: Arc::new(jwt),
        }
    }
}

/// HTTP server for the inventory API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over opened services
    pub fn new(config: HttpServerConfig, services: &Services) -> Self {
        let router = Self::build_router(&config, services);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, services: &Services) -> Router {
        let guard = AccessGuard::new(services.jwt.clone());
        let auth_state = Arc::new(AuthState::new(
            AuthService::new(services.users.clone(), services.jwt.clone()),
            guard.clone(),
        ));
        let inventory_state = Arc::new(InventoryState::new(services.products.clone(), guard));

        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let mut router = Router::new()
            .merge(health_routes())
            .nest("/api/auth", auth_routes(auth_state))
            .nest("/api/products", product_routes(inventory_state.clone()))
            .nest("/api/reports", report_routes(inventory_state));

        // Browser assets for everything the API does not claim
        if let Some(dir) = &config.static_dir {
            router = router.fallback_service(ServeDir::new(dir));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "stockroom listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
