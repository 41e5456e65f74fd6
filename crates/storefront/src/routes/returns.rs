//! Return (RMA) route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::ReturnConfirmation;
use crate::error::Result;
use crate::models::session;
use crate::services::returns;
use crate::state::AppState;
use crate::validation::ReturnForm;

/// File a return request against an order placed in this session.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<ReturnForm>,
) -> Result<(StatusCode, Json<ReturnConfirmation>)> {
    let own_orders = session::load_order_ids(&session).await?;
    let confirmation = returns::request_return(state.backend(), &own_orders, form).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}
