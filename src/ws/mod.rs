//! Operator WebSocket layer: connection handling, message routing, and
//! per-connection held controls.
//!
//! The endpoint at `/ws` carries press/release input from the control
//! page and pushes connection status changes back to it.

pub mod connection;
pub mod handler;
pub mod held;
pub mod messages;
