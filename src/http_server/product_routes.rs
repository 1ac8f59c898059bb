//! Product HTTP Routes
//!
//! CRUD over the product store. Reads and writes need any valid token,
//! deletion needs an admin.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::errors::{parse_id, run_blocking, ApiError, ApiResult};
use crate::auth::{AccessGuard, Role};
use crate::inventory::{parse_price, parse_stock, Product, ProductDraft, ProductPatch};
use crate::inventory::product::DEFAULT_CATEGORY;
use crate::store::{RecordId, RecordStore, StoreError};

/// Shared inventory state
pub struct InventoryState {
    pub products: Arc<RecordStore<Product>>,
    pub guard: AccessGuard,
    /// Serializes SKU uniqueness checks with the write that follows
    sku_lock: Mutex<()>,
}

impl InventoryState {
    pub fn new(products: Arc<RecordStore<Product>>, guard: AccessGuard) -> Self {
        Self {
            products,
            guard,
            sku_lock: Mutex::new(()),
        }
    }

    fn sku_taken(&self, sku: &str, except: Option<RecordId>) -> ApiResult<bool> {
        Ok(self
            .products
            .find_first(|p| p.sku == sku && Some(p.id) != except)?
            .is_some())
    }

    /// Create a product unless its SKU is already in use
    fn create(&self, draft: ProductDraft) -> ApiResult<Product> {
        let _lock = self.sku_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        if self.sku_taken(&draft.sku, None)? {
            return Err(ApiError::Conflict("SKU already exists".into()));
        }

        Ok(self.products.create(draft)?)
    }

    /// Patch a product; a new SKU must not belong to another product
    fn update(&self, id: RecordId, patch: ProductPatch) -> ApiResult<Product> {
        let _lock = self.sku_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        if self.products.get(id)?.is_none() {
            return Err(ApiError::NotFound);
        }
        if let Some(sku) = &patch.sku {
            if self.sku_taken(sku, Some(id))? {
                return Err(ApiError::Conflict("SKU already exists".into()));
            }
        }

        self.products.update(id, patch)?.ok_or(ApiError::NotFound)
    }
}

/// Product create/update body. Price and stock accept numbers or strings.
#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub price: Option<Value>,
    pub stock: Option<Value>,
}

/// Product routes with shared state
pub fn product_routes(state: Arc<InventoryState>) -> Router {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route(
            "/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn list_handler(
    State(state): State<Arc<InventoryState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Product>>> {
    state.guard.require(&headers, Role::User)?;
    Ok(Json(state.products.list()?))
}

async fn get_handler(
    State(state): State<Arc<InventoryState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    state.guard.require(&headers, Role::User)?;

    state
        .products
        .get(parse_id(&id)?)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn create_handler(
    State(state): State<Arc<InventoryState>>,
    headers: HeaderMap,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let claims = state.guard.require(&headers, Role::User)?;
    let Json(request) = payload?;

    let (name, sku) = match (non_empty(request.name), non_empty(request.sku)) {
        (Some(name), Some(sku)) => (name, sku),
        _ => return Err(ApiError::BadRequest("name and sku are required".into())),
    };

    let draft = ProductDraft {
        name,
        sku,
        category: non_empty(request.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        price: request.price.as_ref().map(parse_price).unwrap_or(0.0),
        stock: request.stock.as_ref().map(parse_stock).unwrap_or(0.0),
    };

    let product = run_blocking(move || state.create(draft)).await?;
    info!(id = product.id, sku = %product.sku, by = %claims.username, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_handler(
    State(state): State<Arc<InventoryState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    state.guard.require(&headers, Role::User)?;
    let id = parse_id(&id)?;
    let Json(request) = payload?;

    let patch = ProductPatch {
        name: request.name,
        sku: request.sku,
        category: request.category,
        price: request.price.as_ref().map(parse_price),
        stock: request.stock.as_ref().map(parse_stock),
    };

    Ok(Json(run_blocking(move || state.update(id, patch)).await?))
}

async fn delete_handler(
    State(state): State<Arc<InventoryState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let claims = state.guard.require(&headers, Role::Admin)?;
    let id = parse_id(&id)?;

    let products = state.products.clone();
    if !run_blocking(move || Ok(products.remove(id)?)).await? {
        return Err(ApiError::NotFound);
    }

    info!(id, by = %claims.username, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
