//! Command repeater: publishes a direction's velocity command on a fixed
//! period while its control is held.
//!
//! Each active direction owns one spawned task behind a [`RepeatHandle`].
//! The handles live in a single map so that a direction can never have
//! two timers running at once.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use utoipa::ToSchema;

use crate::domain::{CommandSet, ConnectionStatus, Direction, VelocityCommand};
use crate::error::{TeleopError, TransportError};
use crate::transport::CommandChannel;

/// Whether publishing depends on the visible connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PublishGate {
    /// Always hand commands to the transport; it decides what to drop.
    #[default]
    Always,
    /// Only publish while the monitor shows
    /// [`crate::domain::ConnectionState::Connected`].
    WhenConnected,
}

impl PublishGate {
    /// Returns the configuration name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::WhenConnected => "when_connected",
        }
    }
}

impl fmt::Display for PublishGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublishGate {
    type Err = TeleopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "when_connected" => Ok(Self::WhenConnected),
            other => Err(TeleopError::InvalidConfig(format!(
                "publish gate must be `always` or `when_connected`, got `{other}`"
            ))),
        }
    }
}

/// Description of an active repeat, returned to callers of
/// [`CommandRepeater::start`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RepeatInfo {
    /// Unique ID of this repeat.
    pub id: uuid::Uuid,
    /// Direction being repeated.
    pub direction: Direction,
    /// When the repeat was started.
    pub started_at: DateTime<Utc>,
    /// Publish period in milliseconds.
    pub period_ms: u64,
}

/// Live periodic-publish task for one direction.
///
/// Dropping the handle aborts the task: no further ticks fire, a tick
/// already executing completes.
#[derive(Debug)]
pub struct RepeatHandle {
    info: RepeatInfo,
    task: JoinHandle<()>,
}

impl RepeatHandle {
    /// Returns the description of this repeat.
    #[must_use]
    pub const fn info(&self) -> &RepeatInfo {
        &self.info
    }

    /// Returns `true` while the task is still scheduled.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for RepeatHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Result of [`CommandRepeater::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new repeat was started.
    Started(RepeatInfo),
    /// The direction was already repeating; nothing changed.
    AlreadyActive(RepeatInfo),
}

impl StartOutcome {
    /// Returns the repeat now active for the direction.
    #[must_use]
    pub const fn info(&self) -> &RepeatInfo {
        match self {
            Self::Started(info) | Self::AlreadyActive(info) => info,
        }
    }

    /// Returns `true` if this call started the repeat.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

/// Starts and stops per-direction periodic publishes on one channel.
#[derive(Debug)]
pub struct CommandRepeater {
    channel: CommandChannel,
    commands: CommandSet,
    period: Duration,
    gate: PublishGate,
    status: watch::Receiver<ConnectionStatus>,
    active: Mutex<HashMap<Direction, RepeatHandle>>,
}

impl CommandRepeater {
    /// Creates a repeater publishing `commands` on `channel` every `period`.
    ///
    /// `status` is consulted only under [`PublishGate::WhenConnected`].
    ///
    /// # Errors
    ///
    /// Returns [`TeleopError::InvalidConfig`] if `period` is zero.
    pub fn new(
        channel: CommandChannel,
        commands: CommandSet,
        period: Duration,
        gate: PublishGate,
        status: watch::Receiver<ConnectionStatus>,
    ) -> Result<Self, TeleopError> {
        if period.is_zero() {
            return Err(TeleopError::InvalidConfig(
                "repeat period must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            channel,
            commands,
            period,
            gate,
            status,
            active: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the channel commands are published on.
    #[must_use]
    pub const fn channel(&self) -> &CommandChannel {
        &self.channel
    }

    /// Returns the command bound to each direction.
    #[must_use]
    pub const fn commands(&self) -> &CommandSet {
        &self.commands
    }

    /// Returns the repeat period.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Returns the publish gate policy.
    #[must_use]
    pub const fn gate(&self) -> PublishGate {
        self.gate
    }

    /// Starts repeating `direction`'s command.
    ///
    /// The first publish happens one period from now. If the direction is
    /// already repeating, the existing repeat is kept and returned as
    /// [`StartOutcome::AlreadyActive`].
    pub async fn start(&self, direction: Direction) -> StartOutcome {
        let mut active = self.active.lock().await;
        if let Some(handle) = active.get(&direction)
            && handle.is_live()
        {
            tracing::debug!(%direction, "repeat already active");
            return StartOutcome::AlreadyActive(handle.info().clone());
        }

        let info = RepeatInfo {
            id: uuid::Uuid::new_v4(),
            direction,
            started_at: Utc::now(),
            period_ms: u64::try_from(self.period.as_millis()).unwrap_or(u64::MAX),
        };
        let ticker = self.ticker(direction);
        let first = Instant::now() + self.period;
        let task = tokio::spawn(ticker.run(first, self.period));

        // Replaces a finished handle, if one was left behind.
        active.insert(
            direction,
            RepeatHandle {
                info: info.clone(),
                task,
            },
        );
        tracing::info!(%direction, period_ms = info.period_ms, "repeat started");
        StartOutcome::Started(info)
    }

    /// Stops repeating `direction`. No-op if it is not repeating.
    ///
    /// Returns the repeat that was stopped, if any.
    pub async fn stop(&self, direction: Direction) -> Option<RepeatInfo> {
        let handle = self.active.lock().await.remove(&direction)?;
        tracing::info!(%direction, "repeat stopped");
        Some(handle.info().clone())
    }

    /// Stops `direction` only if its active repeat is the one identified by
    /// `id`. A repeat that was since stopped and restarted is left alone.
    pub async fn stop_repeat(&self, direction: Direction, id: uuid::Uuid) -> Option<RepeatInfo> {
        let mut active = self.active.lock().await;
        if active.get(&direction).is_none_or(|h| h.info().id != id) {
            return None;
        }
        let handle = active.remove(&direction)?;
        drop(active);
        tracing::info!(%direction, repeat_id = %id, "repeat stopped");
        Some(handle.info().clone())
    }

    /// Stops every active repeat. Returns how many were active.
    pub async fn stop_all(&self) -> usize {
        let mut active = self.active.lock().await;
        let count = active.len();
        active.clear();
        drop(active);
        if count > 0 {
            tracing::info!(count, "all repeats stopped");
        }
        count
    }

    /// Publishes `direction`'s command once, immediately.
    ///
    /// # Errors
    ///
    /// Returns [`TeleopError::Transport`] if the publish gate is closed or
    /// the transport rejects the message.
    pub fn publish_once(&self, direction: Direction) -> Result<(), TeleopError> {
        self.ticker(direction).publish()?;
        tracing::debug!(%direction, "published once");
        Ok(())
    }

    /// Returns the active repeats in control-panel order.
    pub async fn active(&self) -> Vec<RepeatInfo> {
        let active = self.active.lock().await;
        Direction::ALL
            .iter()
            .filter_map(|d| active.get(d))
            .filter(|h| h.is_live())
            .map(|h| h.info().clone())
            .collect()
    }

    /// Returns `true` if `direction` is repeating.
    pub async fn is_active(&self, direction: Direction) -> bool {
        self.active
            .lock()
            .await
            .get(&direction)
            .is_some_and(RepeatHandle::is_live)
    }

    fn ticker(&self, direction: Direction) -> Ticker {
        Ticker {
            direction,
            command: *self.commands.get(direction),
            channel: self.channel.clone(),
            gate: self.gate,
            status: self.status.clone(),
        }
    }
}

/// Everything one direction's task needs to publish.
struct Ticker {
    direction: Direction,
    command: VelocityCommand,
    channel: CommandChannel,
    gate: PublishGate,
    status: watch::Receiver<ConnectionStatus>,
}

impl Ticker {
    async fn run(self, first: Instant, period: Duration) {
        let mut interval = tokio::time::interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            self.tick();
        }
    }

    /// One scheduled publish. Failures are logged and the repeat goes on.
    fn tick(&self) {
        match self.publish() {
            Ok(()) => tracing::trace!(direction = %self.direction, "tick published"),
            Err(TransportError::NotConnected) if self.gate == PublishGate::WhenConnected => {
                tracing::debug!(direction = %self.direction, "not connected; tick skipped");
            }
            Err(err) => {
                tracing::warn!(direction = %self.direction, error = %err, "tick publish failed");
            }
        }
    }

    fn publish(&self) -> Result<(), TransportError> {
        if self.gate == PublishGate::WhenConnected && !self.status.borrow().is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.channel.publish(&self.command)
    }
}
