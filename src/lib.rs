//! # teleop-gateway
//!
//! Operator gateway that drives a mobile robot over a rosbridge websocket.
//!
//! Operators hold drive controls on a web page or call the REST API; the
//! gateway republishes the matching velocity command on the command topic
//! every repeat period until the control is released, and shows the bridge
//! connection state as exactly one of connecting, connected, closed or
//! errored.
//!
//! ## Architecture
//!
//! ```text
//! Operators (browser page, HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── Control page (ui) + WS Handler (ws/)
//!     │
//!     ├── CommandRepeater (service/)  ──►  CommandChannel (transport/)
//!     ├── ConnectionMonitor (service/) ◄──  EventBus (domain/)
//!     │                                        ▲
//!     └── RosbridgeTransport (transport/) ─────┘
//!             │
//!             └── rosbridge server (ws://…)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod transport;
pub mod ui;
pub mod ws;
