//! Service layer: the connection monitor and the command repeater.

pub mod monitor;
pub mod repeater;

pub use monitor::ConnectionMonitor;
pub use repeater::{CommandRepeater, PublishGate, RepeatHandle, RepeatInfo, StartOutcome};
