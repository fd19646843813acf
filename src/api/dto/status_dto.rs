//! Status DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ConnectionStatus;
use crate::service::RepeatInfo;

/// Response body for `GET /api/v1/status`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// What the status display currently shows.
    pub connection: ConnectionStatus,
    /// Directions currently repeating, in control-panel order.
    pub active: Vec<RepeatInfo>,
}
