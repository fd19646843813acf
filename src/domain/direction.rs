//! Operator drive directions.
//!
//! [`Direction`] keys everything per-control: the command set, the
//! repeater's handle map, and the REST/WebSocket routes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::TeleopError;

/// One of the four operator controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Drive forward (`linear.x > 0`).
    Forward,
    /// Drive backward (`linear.x < 0`).
    Backward,
    /// Rotate counter-clockwise (`angular.z > 0`).
    TurnLeft,
    /// Rotate clockwise (`angular.z < 0`).
    TurnRight,
}

impl Direction {
    /// All directions in control-panel order.
    pub const ALL: [Self; 4] = [Self::Forward, Self::Backward, Self::TurnLeft, Self::TurnRight];

    /// Returns the wire name used in routes and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::TurnLeft => "turn_left",
            Self::TurnRight => "turn_right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = TeleopError;

    /// Parses a wire name or one of the button aliases
    /// (`up`, `down`, `left`, `right`). Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "up" => Ok(Self::Forward),
            "backward" | "down" => Ok(Self::Backward),
            "turn_left" | "left" => Ok(Self::TurnLeft),
            "turn_right" | "right" => Ok(Self::TurnRight),
            _ => Err(TeleopError::UnknownDirection(s.to_string())),
        }
    }
}
