//! Connection monitor: maps transport lifecycle events to the visible
//! connection status.

use tokio::sync::{broadcast, watch};

use crate::domain::{ConnectionState, ConnectionStatus, TransportEvent};

/// Longest diagnostic kept in [`ConnectionStatus::detail`], in bytes.
const MAX_DETAIL_LEN: usize = 512;

/// Diagnostic shown when the transport supplies none.
const UNKNOWN_ERROR: &str = "unknown transport error";

/// Renders transport lifecycle signals as one exclusive [`ConnectionState`].
///
/// Every transition overwrites the whole status, so a stale state is never
/// visible next to the current one. Observers read the status through
/// [`ConnectionMonitor::subscribe`].
#[derive(Debug)]
pub struct ConnectionMonitor {
    status: watch::Sender<ConnectionStatus>,
}

impl ConnectionMonitor {
    /// Creates a monitor in [`ConnectionState::Connecting`].
    #[must_use]
    pub fn new() -> Self {
        let (status, _) = watch::channel(ConnectionStatus::default());
        Self { status }
    }

    /// Transport reported a failure. Never fails itself.
    pub fn on_error(&self, details: &str) {
        let detail = sanitize_detail(details);
        tracing::warn!(error = %detail, "transport error");
        self.show(ConnectionStatus::new(ConnectionState::Errored, Some(detail)));
    }

    /// Handshake completed.
    pub fn on_connected(&self) {
        tracing::info!("connection made");
        self.show(ConnectionStatus::new(ConnectionState::Connected, None));
    }

    /// Connection torn down.
    pub fn on_closed(&self) {
        tracing::info!("connection closed");
        self.show(ConnectionStatus::new(ConnectionState::Closed, None));
    }

    /// Dispatches one lifecycle event.
    pub fn handle(&self, event: &TransportEvent) {
        match event {
            TransportEvent::Errored { details } => self.on_error(details),
            TransportEvent::Connected => self.on_connected(),
            TransportEvent::Closed => self.on_closed(),
        }
    }

    /// Consumes lifecycle events until the bus closes.
    pub async fn run(&self, mut events: broadcast::Receiver<TransportEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.handle(&event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "connection monitor lagged behind event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("connection monitor stopped");
    }

    /// Returns the currently visible status.
    #[must_use]
    pub fn current(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    /// Returns a receiver notified on every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    fn show(&self, status: ConnectionStatus) {
        self.status.send_replace(status);
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort diagnostic: non-empty and bounded.
fn sanitize_detail(details: &str) -> String {
    let trimmed = details.trim();
    if trimmed.is_empty() {
        return UNKNOWN_ERROR.to_string();
    }
    if trimmed.len() <= MAX_DETAIL_LEN {
        return trimmed.to_string();
    }
    let mut end = MAX_DETAIL_LEN;
    while !trimmed.is_char_boundary(end) {
        end = end.saturating_sub(1);
    }
    trimmed.get(..end).unwrap_or(UNKNOWN_ERROR).to_string()
}
