//! Error types with HTTP status code mapping.
//!
//! [`TransportError`] covers failures of the publish path and the
//! rosbridge session. [`TeleopError`] is the central error type for the
//! gateway; each variant maps to a specific HTTP status code and
//! structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "unknown direction: sideways",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Failure of the transport's publish primitive or session.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No session with the bridge is currently established.
    #[error("transport not connected")]
    NotConnected,

    /// The transport was closed and accepts no more messages.
    #[error("transport shut down")]
    Shutdown,

    /// The payload could not be encoded as JSON.
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The websocket handshake with the bridge failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The established session failed while reading or writing.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Gateway error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status                  |
/// |-----------|------------|------------------------------|
/// | 1000–1999 | Validation | 400 Bad Request              |
/// | 3000–3999 | Server     | 500 Internal Server Error    |
/// | 5000–5999 | Transport  | 502 Bad Gateway / 503 Unavailable |
#[derive(Debug, thiserror::Error)]
pub enum TeleopError {
    /// Direction name not recognised.
    #[error("unknown direction: {0}")]
    UnknownDirection(String),

    /// A configuration value is missing or malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Publishing through the transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl TeleopError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::UnknownDirection(_) => 1001,
            Self::InvalidConfig(_) => 1002,
            Self::Transport(TransportError::Serialize(_)) => 3001,
            Self::Transport(TransportError::NotConnected) => 5001,
            Self::Transport(TransportError::Shutdown) => 5002,
            Self::Transport(TransportError::Connect(_)) => 5003,
            Self::Transport(TransportError::Protocol(_)) => 5004,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownDirection(_) | Self::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            Self::Transport(TransportError::Serialize(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Transport(TransportError::NotConnected | TransportError::Shutdown) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Transport(TransportError::Connect(_) | TransportError::Protocol(_)) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for TeleopError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
