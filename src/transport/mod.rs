//! Transport layer: the publish seam, command channels, and the rosbridge
//! websocket client.
//!
//! Everything above this module talks to the bridge through the
//! [`Transport`] trait; lifecycle changes travel separately on the
//! [`crate::domain::EventBus`].

pub mod channel;
pub mod protocol;
pub mod rosbridge;

use std::fmt;

use crate::error::TransportError;

pub use channel::CommandChannel;
pub use rosbridge::{RosbridgeOptions, RosbridgeTransport};

/// Bidirectional pub/sub connection to the middleware bus.
///
/// Implementations must not block: `publish` enqueues and returns.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Publishes `payload` on `channel` typed as `schema_id`.
    ///
    /// Fire-and-forget: success means the message was accepted for
    /// sending, not that the bus received it.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] while no session is up and
    /// [`TransportError::Shutdown`] once the transport has been closed.
    fn publish(
        &self,
        channel: &str,
        schema_id: &str,
        payload: serde_json::Value,
    ) -> Result<(), TransportError>;

    /// Returns `true` while a session with the bus is established.
    fn is_connected(&self) -> bool;
}
