//! Velocity command values.
//!
//! [`VelocityCommand`] serializes to the `geometry_msgs/Twist` JSON shape
//! expected by rosbridge. [`CommandSet`] maps each [`Direction`] to the
//! command its control publishes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Direction;

/// A 3-component vector (`geometry_msgs/Vector3`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Vector3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vector3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Immutable linear + angular velocity (`geometry_msgs/Twist`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct VelocityCommand {
    /// Linear velocity in m/s.
    pub linear: Vector3,
    /// Angular velocity in rad/s.
    pub angular: Vector3,
}

impl VelocityCommand {
    /// Drive forward at 0.5 m/s.
    pub const FORWARD: Self = Self::new(Vector3::new(0.5, 0.0, 0.0), Vector3::ZERO);
    /// Drive backward at 0.5 m/s.
    pub const BACKWARD: Self = Self::new(Vector3::new(-0.5, 0.0, 0.0), Vector3::ZERO);
    /// Rotate counter-clockwise at 1 rad/s.
    pub const TURN_LEFT: Self = Self::new(Vector3::ZERO, Vector3::new(0.0, 0.0, 1.0));
    /// Rotate clockwise at 1 rad/s.
    pub const TURN_RIGHT: Self = Self::new(Vector3::ZERO, Vector3::new(0.0, 0.0, -1.0));

    /// Creates a command from its linear and angular parts.
    #[must_use]
    pub const fn new(linear: Vector3, angular: Vector3) -> Self {
        Self { linear, angular }
    }

    /// Returns the canonical command for `direction`.
    #[must_use]
    pub const fn canonical(direction: Direction) -> Self {
        match direction {
            Direction::Forward => Self::FORWARD,
            Direction::Backward => Self::BACKWARD,
            Direction::TurnLeft => Self::TURN_LEFT,
            Direction::TurnRight => Self::TURN_RIGHT,
        }
    }
}

/// The command published by each direction's control.
///
/// Missing entries in a deserialized set keep their canonical value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CommandSet {
    /// Command for [`Direction::Forward`].
    pub forward: VelocityCommand,
    /// Command for [`Direction::Backward`].
    pub backward: VelocityCommand,
    /// Command for [`Direction::TurnLeft`].
    pub turn_left: VelocityCommand,
    /// Command for [`Direction::TurnRight`].
    pub turn_right: VelocityCommand,
}

impl CommandSet {
    /// Returns the command bound to `direction`.
    #[must_use]
    pub const fn get(&self, direction: Direction) -> &VelocityCommand {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
            Direction::TurnLeft => &self.turn_left,
            Direction::TurnRight => &self.turn_right,
        }
    }
}

impl Default for CommandSet {
    fn default() -> Self {
        Self {
            forward: VelocityCommand::FORWARD,
            backward: VelocityCommand::BACKWARD,
            turn_left: VelocityCommand::TURN_LEFT,
            turn_right: VelocityCommand::TURN_RIGHT,
        }
    }
}
