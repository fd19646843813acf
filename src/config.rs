//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Parsing goes through
//! [`TeleopConfig::from_lookup`] so any key/value source can be used.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::CommandSet;
use crate::error::TeleopError;
use crate::service::PublishGate;

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`TeleopConfig::from_env`].
#[derive(Debug, Clone)]
pub struct TeleopConfig {
    /// Socket address to bind the operator HTTP server to.
    pub listen_addr: SocketAddr,

    /// Rosbridge websocket URL (e.g. `ws://localhost:9090`).
    pub endpoint: String,

    /// Topic velocity commands are published on.
    pub channel_name: String,

    /// Message type of the command topic.
    pub schema_id: String,

    /// Period between repeated publishes while a control is held, in ms.
    pub repeat_period_ms: u64,

    /// Whether publishing waits for a visible `Connected` state.
    pub publish_gate: PublishGate,

    /// Delay before reconnecting after a lost session, in ms (0 = never).
    pub reconnect_delay_ms: u64,

    /// Capacity of the lifecycle EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Command published by each direction.
    pub commands: CommandSet,
}

impl TeleopConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// See [`TeleopConfig::from_lookup`].
    pub fn from_env() -> Result<Self, TeleopError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Falls back to defaults when a key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`TeleopError::InvalidConfig`] if `LISTEN_ADDR` is not a
    /// socket address, `ROSBRIDGE_URL` is not a `ws://` URL,
    /// `REPEAT_PERIOD_MS` or `EVENT_BUS_CAPACITY` is zero or not a number,
    /// `PUBLISH_GATE` is unknown, or `TELEOP_COMMANDS` is not a valid
    /// command set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TeleopError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:5000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| TeleopError::InvalidConfig(format!("LISTEN_ADDR: {e}")))?;

        let endpoint = lookup("ROSBRIDGE_URL").unwrap_or_else(|| "ws://localhost:9090".to_string());
        validate_endpoint(&endpoint)?;

        let channel_name = lookup("CMD_VEL_TOPIC").unwrap_or_else(|| "/cmd_vel".to_string());
        let schema_id = lookup("CMD_VEL_TYPE").unwrap_or_else(|| "geometry_msgs/Twist".to_string());

        let repeat_period_ms = parse_positive(&lookup, "REPEAT_PERIOD_MS", 3000_u64)?;
        let event_bus_capacity = parse_positive(&lookup, "EVENT_BUS_CAPACITY", 64_usize)?;
        let reconnect_delay_ms = parse_env(&lookup, "RECONNECT_DELAY_MS", 5000);

        let publish_gate = match lookup("PUBLISH_GATE") {
            Some(raw) => raw.parse()?,
            None => PublishGate::default(),
        };

        let commands = match lookup("TELEOP_COMMANDS") {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| TeleopError::InvalidConfig(format!("TELEOP_COMMANDS: {e}")))?,
            None => CommandSet::default(),
        };

        Ok(Self {
            listen_addr,
            endpoint,
            channel_name,
            schema_id,
            repeat_period_ms,
            publish_gate,
            reconnect_delay_ms,
            event_bus_capacity,
            commands,
        })
    }

    /// Repeat period as a [`Duration`].
    #[must_use]
    pub const fn repeat_period(&self) -> Duration {
        Duration::from_millis(self.repeat_period_ms)
    }

    /// Reconnect delay, or `None` when reconnecting is disabled.
    #[must_use]
    pub const fn reconnect_delay(&self) -> Option<Duration> {
        if self.reconnect_delay_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.reconnect_delay_ms))
        }
    }
}

/// Accepts `ws://host[:port][/path]` only.
fn validate_endpoint(endpoint: &str) -> Result<(), TeleopError> {
    match endpoint.strip_prefix("ws://") {
        Some(rest) if !rest.is_empty() => Ok(()),
        _ => Err(TeleopError::InvalidConfig(format!(
            "ROSBRIDGE_URL must be a ws:// URL, got `{endpoint}`"
        ))),
    }
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses a required-positive numeric variable. Unlike [`parse_env`], a
/// present but invalid value is an error.
fn parse_positive<F, T>(lookup: &F, key: &str, default: T) -> Result<T, TeleopError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => Ok(value),
        _ => Err(TeleopError::InvalidConfig(format!(
            "{key} must be a positive integer, got `{raw}`"
        ))),
    }
}
