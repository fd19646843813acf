//! Domain layer: directions, velocity commands, connection status, and
//! the lifecycle event bus.

pub mod connection;
pub mod direction;
pub mod event_bus;
pub mod transport_event;
pub mod velocity;

pub use connection::{ConnectionState, ConnectionStatus};
pub use direction::Direction;
pub use event_bus::EventBus;
pub use transport_event::TransportEvent;
pub use velocity::{CommandSet, Vector3, VelocityCommand};
