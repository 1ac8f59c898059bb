//! Report HTTP Routes

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};

use super::errors::ApiResult;
use super::product_routes::InventoryState;
use crate::auth::Role;
use crate::inventory::{summarize, StockSummary};

/// Report routes; they share the inventory state with the product routes
pub fn report_routes(state: Arc<InventoryState>) -> Router {
    Router::new()
        .route("/stock/summary", get(stock_summary_handler))
        .with_state(state)
}

/// Stock per category and total inventory value
async fn stock_summary_handler(
    State(state): State<Arc<InventoryState>>,
    headers: HeaderMap,
) -> ApiResult<Json<StockSummary>> {
    state.guard.require(&headers, Role::User)?;

    let products = state.products.list()?;
    Ok(Json(summarize(&products)))
}
