//! Catalog route handlers: products and shipping options.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use paintshop_core::ProductId;

use crate::catalog::{Product, ShippingOption};
use crate::error::Result;
use crate::state::AppState;

/// List all products.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.backend().list_products().await?))
}

/// Show a single product with its colors and finishes.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    Ok(Json(state.backend().get_product(&ProductId::new(id)).await?))
}

/// List delivery methods.
#[instrument(skip(state))]
pub async fn shipping_options(State(state): State<AppState>) -> Result<Json<Vec<ShippingOption>>> {
    Ok(Json(state.backend().list_shipping_options().await?))
}
