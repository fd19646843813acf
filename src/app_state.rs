//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{CommandRepeater, ConnectionMonitor};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Per-direction command repeater.
    pub repeater: Arc<CommandRepeater>,
    /// Connection status shown to operators.
    pub monitor: Arc<ConnectionMonitor>,
}
