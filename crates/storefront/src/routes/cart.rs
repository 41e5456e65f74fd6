//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every mutation returns the
//! updated cart so the client can re-render without a second request.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use paintshop_core::{ColorId, FinishId, Money, ProductId};

use crate::cart::{Cart, CartItem, LineKey};
use crate::error::{Result, add_breadcrumb};
use crate::models::session;
use crate::services::trade;
use crate::state::AppState;
use crate::validation::BulkOrderForm;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub item: CartItem,
    pub line_total: Decimal,
    pub unit_price_display: String,
    pub line_total_display: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u64,
    pub subtotal: Decimal,
    pub subtotal_display: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let subtotal = cart.total_price();
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartLineView {
                    line_total: item.line_total(),
                    unit_price_display: Money::usd(item.unit_price).display(),
                    line_total_display: Money::usd(item.line_total()).display(),
                    item: item.clone(),
                })
                .collect(),
            item_count: cart.total_items(),
            subtotal,
            subtotal_display: Money::usd(subtotal).display(),
        }
    }
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub color_id: ColorId,
    pub finish_id: FinishId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    #[serde(flatten)]
    pub key: LineKey,
    pub quantity: u32,
}

/// Display the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = session::load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add an item, merging with an existing line for the same color and finish.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = state.backend().get_product(&request.product_id).await?;
    let item = product.line_item(&request.color_id, &request.finish_id, request.quantity)?;

    let mut cart = session::load_cart(&session).await?;
    cart.add_item(item)?;
    session::store_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[("product_id", request.product_id.as_str())]),
    );
    Ok(Json(CartView::from(&cart)))
}

/// Set a line's quantity. Zero is rejected; use remove instead.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = session::load_cart(&session).await?;
    cart.update_quantity(&request.key, request.quantity)?;
    session::store_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Remove a line. Removing a line that is not in the cart is a no-op.
#[instrument(skip(session))]
pub async fn remove(session: Session, Json(key): Json<LineKey>) -> Result<Json<CartView>> {
    let mut cart = session::load_cart(&session).await?;
    if cart.remove_item(&key) {
        session::store_cart(&session, &cart).await?;
    }
    Ok(Json(CartView::from(&cart)))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = session::load_cart(&session).await?;
    cart.clear();
    session::store_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add a trade bulk order.
#[instrument(skip(state, session, form))]
pub async fn bulk(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<BulkOrderForm>,
) -> Result<Json<CartView>> {
    let mut cart = session::load_cart(&session).await?;
    trade::add_bulk_order(&mut cart, state.backend().catalog(), &form)?;
    session::store_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}
