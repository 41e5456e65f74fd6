//! Account dashboard route handlers.
//!
//! There is no login: the dashboard shows the orders placed in the current
//! session.

use axum::{
    Json,
    extract::{Path, State},
};
use tower_sessions::Session;
use tracing::instrument;

use paintshop_core::OrderId;

use crate::checkout::OrderConfirmation;
use crate::error::{AppError, Result};
use crate::models::session;
use crate::state::AppState;

/// Order history, newest first.
#[instrument(skip(state, session))]
pub async fn orders(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<OrderConfirmation>>> {
    let ids = session::load_order_ids(&session).await?;
    Ok(Json(state.backend().list_orders(&ids).await?))
}

/// A single order placed in this session.
#[instrument(skip(state, session))]
pub async fn order(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<OrderConfirmation>> {
    let id = OrderId::new(id);
    if !session::load_order_ids(&session).await?.contains(&id) {
        return Err(AppError::NotFound(format!("order {id}")));
    }
    Ok(Json(state.backend().get_order(&id).await?))
}
