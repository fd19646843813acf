//! Transport lifecycle events.
//!
//! The transport emits a [`TransportEvent`] through the
//! [`super::EventBus`] on every lifecycle change; the connection monitor
//! consumes them.

use serde::Serialize;

/// A lifecycle signal reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TransportEvent {
    /// Connection-level failure, before or after establishment.
    Errored {
        /// Free-form diagnostic from the transport.
        details: String,
    },
    /// Handshake completed.
    Connected,
    /// Connection torn down (explicit close or remote disconnect).
    Closed,
}

impl TransportEvent {
    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::Errored { .. } => "errored",
            Self::Connected => "connected",
            Self::Closed => "closed",
        }
    }
}
