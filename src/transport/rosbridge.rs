//! Rosbridge websocket client.
//!
//! [`RosbridgeTransport`] is the cheap, cloneable publish handle. The
//! connection itself lives in a spawned worker task that owns the socket,
//! reconnects on a fixed delay, and reports every lifecycle change on the
//! [`EventBus`].

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::Transport;
use super::protocol::{RosbridgeOp, op_id};
use crate::domain::{EventBus, TransportEvent};
use crate::error::TransportError;

type BridgeSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Longest wait for the websocket handshake before the attempt counts as failed.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`RosbridgeTransport`].
#[derive(Debug, Clone)]
pub struct RosbridgeOptions {
    /// Bridge URL, e.g. `ws://localhost:9090`.
    pub endpoint: String,
    /// Delay between a lost session and the next attempt; `None` connects once.
    pub reconnect_delay: Option<Duration>,
}

/// Work queued for the worker task.
#[derive(Debug)]
enum Outbound {
    Publish {
        topic: String,
        schema_id: String,
        msg: serde_json::Value,
    },
    Close,
}

/// Publish handle for a rosbridge connection.
#[derive(Debug, Clone)]
pub struct RosbridgeTransport {
    outbound: mpsc::UnboundedSender<Outbound>,
    connected: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
}

impl RosbridgeTransport {
    /// Spawns the connection worker and returns the publish handle
    /// together with the worker's join handle.
    ///
    /// The worker emits [`TransportEvent::Connected`] after each
    /// successful handshake, [`TransportEvent::Errored`] when a connect
    /// attempt or session fails, and [`TransportEvent::Closed`] when a
    /// session ends cleanly or the transport is closed.
    #[must_use]
    pub fn spawn(options: RosbridgeOptions, events: EventBus) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            options,
            events,
            outbound: rx,
            connected: Arc::clone(&connected),
            shutdown: Arc::clone(&shutdown),
            seq: 0,
        };
        let handle = tokio::spawn(worker.run());

        (
            Self {
                outbound: tx,
                connected,
                shutdown,
            },
            handle,
        )
    }

    /// Closes the session and stops reconnecting.
    ///
    /// Subsequent publishes fail with [`TransportError::Shutdown`].
    /// Calling this more than once is a no-op.
    pub fn close(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            let _ = self.outbound.send(Outbound::Close);
        }
    }
}

impl Transport for RosbridgeTransport {
    fn publish(
        &self,
        channel: &str,
        schema_id: &str,
        payload: serde_json::Value,
    ) -> Result<(), TransportError> {
        if self.shutdown.load(Ordering::SeqCst) {
            return Err(TransportError::Shutdown);
        }
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::NotConnected);
        }
        self.outbound
            .send(Outbound::Publish {
                topic: channel.to_string(),
                schema_id: schema_id.to_string(),
                msg: payload,
            })
            .map_err(|_| TransportError::Shutdown)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// State owned by the spawned connection task.
struct Worker {
    options: RosbridgeOptions,
    events: EventBus,
    outbound: mpsc::UnboundedReceiver<Outbound>,
    connected: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    seq: u64,
}

impl Worker {
    async fn run(mut self) {
        let endpoint = self.options.endpoint.clone();
        let mut last = None;

        loop {
            if self.is_shutdown() {
                break;
            }
            self.discard_stale();

            tracing::info!(%endpoint, "connecting to rosbridge");
            let handshake = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(endpoint.as_str()));
            let attempt = tokio::select! {
                attempt = handshake => attempt,
                () = self.wait_for_close() => {
                    tracing::info!(%endpoint, "transport closed during handshake");
                    break;
                }
            };
            let event = match attempt {
                Ok(Ok((socket, _response))) => {
                    self.connected.store(true, Ordering::SeqCst);
                    tracing::info!(%endpoint, "rosbridge connection established");
                    self.events.publish(TransportEvent::Connected);

                    let outcome = self.session(socket).await;
                    self.connected.store(false, Ordering::SeqCst);
                    match outcome {
                        Ok(()) => {
                            tracing::info!(%endpoint, "rosbridge connection closed");
                            TransportEvent::Closed
                        }
                        Err(err) => {
                            tracing::warn!(%endpoint, error = %err, "rosbridge session failed");
                            TransportEvent::Errored {
                                details: err.to_string(),
                            }
                        }
                    }
                }
                Ok(Err(err)) => {
                    let err = TransportError::Connect(err.to_string());
                    tracing::warn!(%endpoint, error = %err, "rosbridge connect failed");
                    TransportEvent::Errored {
                        details: err.to_string(),
                    }
                }
                Err(_elapsed) => {
                    let err = TransportError::Connect(format!(
                        "handshake timed out after {}s",
                        CONNECT_TIMEOUT.as_secs()
                    ));
                    tracing::warn!(%endpoint, error = %err, "rosbridge connect failed");
                    TransportEvent::Errored {
                        details: err.to_string(),
                    }
                }
            };
            self.events.publish(event.clone());
            last = Some(event);

            if self.is_shutdown() {
                break;
            }
            let Some(delay) = self.options.reconnect_delay else {
                break;
            };
            if !self.wait_before_reconnect(delay).await {
                break;
            }
        }

        if self.is_shutdown() && last != Some(TransportEvent::Closed) {
            self.events.publish(TransportEvent::Closed);
        }
        tracing::debug!(%endpoint, "rosbridge worker stopped");
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Drops messages queued for a session that no longer exists.
    fn discard_stale(&mut self) {
        let mut dropped = 0_usize;
        while let Ok(msg) = self.outbound.try_recv() {
            if matches!(msg, Outbound::Publish { .. }) {
                dropped = dropped.saturating_add(1);
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "discarded stale outbound messages");
        }
    }

    /// Sleeps for `delay`, returning `false` early if the transport is closed.
    async fn wait_before_reconnect(&mut self, delay: Duration) -> bool {
        tokio::select! {
            () = tokio::time::sleep(delay) => true,
            () = self.wait_for_close() => false,
        }
    }

    /// Resolves once [`RosbridgeTransport::close`] is called or every
    /// handle is dropped. Publishes queued meanwhile are discarded.
    async fn wait_for_close(&mut self) {
        loop {
            match self.outbound.recv().await {
                Some(Outbound::Publish { .. }) => {}
                Some(Outbound::Close) | None => return,
            }
        }
    }

    /// Runs one established session until it ends.
    ///
    /// `Ok(())` means a clean close from either side.
    async fn session(&mut self, socket: BridgeSocket) -> Result<(), TransportError> {
        let (mut ws_tx, mut ws_rx) = socket.split();
        let mut advertised: HashSet<String> = HashSet::new();

        loop {
            tokio::select! {
                frame = ws_rx.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => handle_inbound(&text),
                        Some(Ok(Message::Close(_))) => {
                            // Sends the queued close reply.
                            let _ = ws_tx.flush().await;
                            return Ok(());
                        }
                        None => return Ok(()),
                        Some(Ok(_)) => {}
                        Some(Err(err)) => return Err(TransportError::Protocol(err.to_string())),
                    }
                }
                outbound = self.outbound.recv() => {
                    match outbound {
                        Some(Outbound::Publish { topic, schema_id, msg }) => {
                            if !advertised.contains(&topic) {
                                self.seq = self.seq.wrapping_add(1);
                                let id = op_id("advertise", &topic, self.seq);
                                send_op(&mut ws_tx, &RosbridgeOp::advertise(id, &topic, &schema_id))
                                    .await?;
                                tracing::debug!(%topic, %schema_id, "advertised topic");
                                advertised.insert(topic.clone());
                            }
                            self.seq = self.seq.wrapping_add(1);
                            let id = op_id("publish", &topic, self.seq);
                            send_op(&mut ws_tx, &RosbridgeOp::publish(id, &topic, msg)).await?;
                        }
                        Some(Outbound::Close) | None => {
                            for topic in advertised.drain() {
                                let op = RosbridgeOp::Unadvertise { id: None, topic };
                                if send_op(&mut ws_tx, &op).await.is_err() {
                                    break;
                                }
                            }
                            let _ = ws_tx.send(Message::Close(None)).await;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

/// Encodes and sends one rosbridge frame.
async fn send_op<S>(sink: &mut S, op: &RosbridgeOp) -> Result<(), TransportError>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let frame = op.to_frame()?;
    sink.send(Message::text(frame))
        .await
        .map_err(|err| TransportError::Protocol(err.to_string()))
}

/// Logs frames sent by the bridge; nothing inbound changes state.
fn handle_inbound(text: &str) {
    match RosbridgeOp::parse(text) {
        Ok(RosbridgeOp::Status { id, level, msg }) => match level.as_str() {
            "error" | "warning" => tracing::warn!(?id, %level, %msg, "rosbridge status"),
            _ => tracing::info!(?id, %level, %msg, "rosbridge status"),
        },
        Ok(op) => tracing::debug!(?op, "ignoring rosbridge frame"),
        Err(err) => tracing::debug!(error = %err, "unrecognised rosbridge frame"),
    }
}
