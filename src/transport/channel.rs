//! Named, schema-typed publish endpoint.

use std::sync::Arc;

use super::Transport;
use crate::domain::VelocityCommand;
use crate::error::TransportError;

/// A publish endpoint bound to one transport and one message schema.
///
/// Name and schema are fixed at construction; there are no setters.
#[derive(Debug, Clone)]
pub struct CommandChannel {
    transport: Arc<dyn Transport>,
    name: Arc<str>,
    schema_id: Arc<str>,
}

impl CommandChannel {
    /// Binds a channel named `name` with schema `schema_id` to `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, name: &str, schema_id: &str) -> Self {
        Self {
            transport,
            name: Arc::from(name),
            schema_id: Arc::from(schema_id),
        }
    }

    /// Returns the channel (topic) name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the message schema identifier.
    #[must_use]
    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    /// Returns `true` while the underlying transport is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Publishes one velocity command.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Serialize`] if the command cannot be
    /// encoded, or whatever the transport's `publish` reports.
    pub fn publish(&self, command: &VelocityCommand) -> Result<(), TransportError> {
        let payload = serde_json::to_value(command)?;
        self.transport.publish(&self.name, &self.schema_id, payload)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::transport::testing::RecordingTransport;

    #[test]
    fn publish_forwards_name_schema_and_twist() {
        let transport = Arc::new(RecordingTransport::new(true));
        let channel = CommandChannel::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            "/cmd_vel",
            "geometry_msgs/Twist",
        );

        let result = channel.publish(&VelocityCommand::FORWARD);
        assert!(result.is_ok());

        let published = transport.published();
        let [only] = published.as_slice() else {
            panic!("expected exactly one publish");
        };
        assert_eq!(only.channel, "/cmd_vel");
        assert_eq!(only.schema_id, "geometry_msgs/Twist");
        assert_eq!(only.payload["linear"]["x"], 0.5);
    }

    #[test]
    fn publish_surfaces_transport_error() {
        let transport = Arc::new(RecordingTransport::new(false));
        let channel = CommandChannel::new(transport, "/cmd_vel", "geometry_msgs/Twist");

        let result = channel.publish(&VelocityCommand::BACKWARD);
        assert!(matches!(result, Err(TransportError::NotConnected)));
        assert!(!channel.is_connected());
    }

    #[test]
    fn accessors_return_construction_values() {
        let transport = Arc::new(RecordingTransport::new(true));
        let channel = CommandChannel::new(transport, "/robot/cmd_vel", "geometry_msgs/Twist");
        assert_eq!(channel.name(), "/robot/cmd_vel");
        assert_eq!(channel.schema_id(), "geometry_msgs/Twist");
    }
}
