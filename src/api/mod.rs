//! REST API layer: route handlers, DTOs, router composition, and the
//! OpenAPI document.
//!
//! Resource endpoints are mounted under `/api/v1`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "teleop-gateway", description = "Operator API for rosbridge velocity commands"),
    paths(
        handlers::command::get_commands,
        handlers::command::start_command,
        handlers::command::stop_command,
        handlers::command::publish_once,
        handlers::command::stop_all,
        handlers::status::get_status,
        handlers::system::health_handler,
    ),
    tags(
        (name = "Commands", description = "Start, stop and tap drive directions"),
        (name = "Status", description = "Bridge connection status"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
