//! Visible connection status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// The four mutually exclusive states of the status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No lifecycle event received yet.
    #[default]
    Connecting,
    /// Handshake with the bridge completed.
    Connected,
    /// The connection was torn down.
    Closed,
    /// The transport reported a failure.
    Errored,
}

impl ConnectionState {
    /// Returns the state name used in JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closed => "closed",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of what the status display shows.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ConnectionStatus {
    /// Current state.
    pub state: ConnectionState,
    /// Diagnostic for the last error; `None` outside [`ConnectionState::Errored`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// When the state was entered.
    pub since: DateTime<Utc>,
}

impl ConnectionStatus {
    /// Creates a status entered now.
    #[must_use]
    pub fn new(state: ConnectionState, detail: Option<String>) -> Self {
        Self {
            state,
            detail,
            since: Utc::now(),
        }
    }

    /// Returns `true` if the state is [`ConnectionState::Connected`].
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new(ConnectionState::Connecting, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_connecting() {
        let status = ConnectionStatus::default();
        assert_eq!(status.state, ConnectionState::Connecting);
        assert!(status.detail.is_none());
        assert!(!status.is_connected());
    }

    #[test]
    fn detail_omitted_when_absent() {
        let json = serde_json::to_value(ConnectionStatus::new(ConnectionState::Closed, None))
            .unwrap_or_default();
        assert_eq!(json["state"], "closed");
        assert!(json.get("detail").is_none());
    }
}
