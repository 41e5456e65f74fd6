//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Health check
//!
//! # Catalog
//! GET    /api/products                  - Product listing
//! GET    /api/products/{id}             - Product detail
//! GET    /api/shipping-options          - Delivery methods
//!
//! # Cart
//! GET    /api/cart                      - Cart contents
//! DELETE /api/cart                      - Empty the cart
//! POST   /api/cart/items                - Add item (merges same color + finish)
//! PATCH  /api/cart/items                - Set a line's quantity
//! DELETE /api/cart/items                - Remove a line
//! POST   /api/cart/bulk                 - Trade bulk order
//!
//! # Checkout
//! GET    /api/checkout                  - Current step, form data, summary
//! DELETE /api/checkout                  - Start over
//! POST   /api/checkout/shipping         - Shipping (and billing) address
//! POST   /api/checkout/shipping-option  - Delivery method
//! POST   /api/checkout/payment          - Payment method
//! POST   /api/checkout/promo            - Apply promo code
//! DELETE /api/checkout/promo            - Remove promo code
//! POST   /api/checkout/next             - Next step
//! POST   /api/checkout/back             - Previous step
//! POST   /api/checkout/step             - Jump to a step
//! POST   /api/checkout/place-order      - Submit the order
//!
//! # Account
//! GET    /api/account/orders            - Orders placed in this session
//! GET    /api/account/orders/{id}       - Order detail
//!
//! # Returns
//! POST   /api/returns                   - File a return request
//! ```

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod returns;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(catalog::index))
        .route("/products/{id}", get(catalog::show))
        .route("/shipping-options", get(catalog::shipping_options))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route(
            "/items",
            post(cart::add).patch(cart::update).delete(cart::remove),
        )
        .route("/bulk", post(cart::bulk))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).delete(checkout::reset))
        .route("/shipping", post(checkout::shipping))
        .route("/shipping-option", post(checkout::shipping_option))
        .route("/payment", post(checkout::payment))
        .route(
            "/promo",
            post(checkout::apply_promo).delete(checkout::remove_promo),
        )
        .route("/next", post(checkout::next))
        .route("/back", post(checkout::back))
        .route("/step", post(checkout::go_to_step))
        .route("/place-order", post(checkout::place_order))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .merge(catalog_routes())
                .nest("/cart", cart_routes())
                .nest("/checkout", checkout_routes())
                .nest("/account", account_routes())
                .route("/returns", post(returns::create)),
        )
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
