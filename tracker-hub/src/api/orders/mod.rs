//! Order API Module
//!
//! Pull half of the sync protocol. Read-only: every mutation arrives as an
//! `update_status` intent on the event channel.

use axum::{Json, Router, extract::Path, extract::State, routing::get};
use shared::OrderSnapshot;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().route("/order/{id}", get(get_by_id))
}

/// GET /order/{id}
///
/// Unknown orders report the zero state.
async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderSnapshot>> {
    if id.trim().is_empty() {
        return Err(AppError::validation("order id is empty"));
    }
    Ok(Json(state.store().snapshot(&id)))
}
