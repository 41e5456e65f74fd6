//! Session-stored shopping state.
//!
//! Each visitor's cart, checkout wizard, and placed order IDs are stored as
//! JSON in their session. Handlers load the value, mutate it, and store it
//! back before responding.

use tower_sessions::Session;
use tower_sessions::session::Error;

use paintshop_core::OrderId;

use crate::cart::Cart;
use crate::checkout::CheckoutStore;

/// Session keys for shopping state.
pub mod keys {
    /// Key for the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for the checkout wizard state.
    pub const CHECKOUT: &str = "checkout";

    /// Key for IDs of orders placed in this session, oldest first.
    pub const ORDER_IDS: &str = "order_ids";
}

/// Load the cart, or an empty one.
///
/// # Errors
///
/// Returns an error if the session store fails or the stored value is corrupt.
pub async fn load_cart(session: &Session) -> Result<Cart, Error> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn store_cart(session: &Session, cart: &Cart) -> Result<(), Error> {
    session.insert(keys::CART, cart).await
}

/// Load the checkout wizard, or a fresh one at step 1.
///
/// # Errors
///
/// Returns an error if the session store fails or the stored value is corrupt.
pub async fn load_checkout(session: &Session) -> Result<CheckoutStore, Error> {
    Ok(session
        .get::<CheckoutStore>(keys::CHECKOUT)
        .await?
        .unwrap_or_default())
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn store_checkout(session: &Session, checkout: &CheckoutStore) -> Result<(), Error> {
    session.insert(keys::CHECKOUT, checkout).await
}

/// IDs of orders placed in this session.
///
/// # Errors
///
/// Returns an error if the session store fails or the stored value is corrupt.
pub async fn load_order_ids(session: &Session) -> Result<Vec<OrderId>, Error> {
    Ok(session
        .get::<Vec<OrderId>>(keys::ORDER_IDS)
        .await?
        .unwrap_or_default())
}

/// Remember a placed order for the account dashboard.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn record_order_id(session: &Session, order_id: OrderId) -> Result<(), Error> {
    let mut ids = load_order_ids(session).await?;
    if !ids.contains(&order_id) {
        ids.push(order_id);
    }
    session.insert(keys::ORDER_IDS, ids).await
}
