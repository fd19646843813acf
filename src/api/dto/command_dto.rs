//! Command start/stop/publish DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{CommandSet, Direction, VelocityCommand};
use crate::service::{PublishGate, RepeatInfo};

/// Response body for `POST /api/v1/commands/{direction}/start`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartResponse {
    /// The repeat now active for the direction.
    pub repeat: RepeatInfo,
    /// `false` if the direction was already repeating.
    pub started: bool,
}

/// Response body for `POST /api/v1/commands/{direction}/stop`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StopResponse {
    /// Direction the stop was requested for.
    pub direction: Direction,
    /// `true` if a repeat was cancelled.
    pub stopped: bool,
    /// The repeat that was cancelled, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatInfo>,
}

/// Response body for `POST /api/v1/commands/{direction}/once`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublishOnceResponse {
    /// Direction that was published.
    pub direction: Direction,
    /// The command handed to the transport.
    pub command: VelocityCommand,
    /// When the publish was accepted.
    pub published_at: DateTime<Utc>,
}

/// Response body for `POST /api/v1/commands/stop-all`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StopAllResponse {
    /// Number of repeats that were cancelled.
    pub stopped: usize,
}

/// Response body for `GET /api/v1/commands`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommandConfigResponse {
    /// Topic commands are published on.
    pub channel_name: String,
    /// Message type of the topic.
    pub schema_id: String,
    /// Repeat period in milliseconds.
    pub repeat_period_ms: u64,
    /// Publish gate policy.
    pub publish_gate: PublishGate,
    /// Command bound to each direction.
    pub commands: CommandSet,
}
