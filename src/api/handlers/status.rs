//! Connection status endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::StatusResponse;
use crate::app_state::AppState;

/// `GET /status` — Connection state and active repeats.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "Status",
    summary = "Connection status",
    description = "Returns the visible connection state (connecting, connected, closed or errored) and the directions currently repeating.",
    responses(
        (status = 200, description = "Current status", body = StatusResponse),
    )
)]
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        connection: state.monitor.current(),
        active: state.repeater.active().await,
    })
}

/// Status routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/status", get(get_status))
}
