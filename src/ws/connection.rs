//! Operator WebSocket connection state machine.
//!
//! Handles the read/write loop for a single operator connection,
//! dispatching press/release commands to the repeater and forwarding
//! connection status changes.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;

use super::held::HeldControls;
use super::messages::{WsCommand, WsMessage, WsMessageType};
use crate::domain::ConnectionStatus;
use crate::service::CommandRepeater;

/// Runs the read/write loop for a single operator WebSocket connection.
///
/// - Sends the current status on connect and every change after that.
/// - Reads commands from the client and dispatches them.
/// - Releases every repeat this connection started and still holds when
///   it ends.
pub async fn run_connection(
    socket: WebSocket,
    repeater: Arc<CommandRepeater>,
    mut status_rx: watch::Receiver<ConnectionStatus>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut held = HeldControls::new();

    let initial = WsMessage::status_event(&status_rx.borrow_and_update()).to_text();
    if ws_tx.send(Message::text(initial)).await.is_ok() {
        loop {
            tokio::select! {
                // Incoming message from client
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let response = handle_text_message(&text, &repeater, &mut held).await;
                            if ws_tx.send(Message::text(response)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                        _ => {}
                    }
                }
                // Status change from the connection monitor
                changed = status_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let event = WsMessage::status_event(&status_rx.borrow_and_update()).to_text();
                    if ws_tx.send(Message::text(event)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    let holding = held.count();
    for (direction, id) in held.drain() {
        if repeater.stop_repeat(direction, id).await.is_some() {
            tracing::info!(%direction, "operator disconnected while holding; released");
        }
    }
    tracing::debug!(holding, "operator ws connection closed");
}

/// Handles a text message from the client, returning the JSON reply.
async fn handle_text_message(
    text: &str,
    repeater: &CommandRepeater,
    held: &mut HeldControls,
) -> String {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON").to_text();
    };

    let command = match serde_json::from_value::<WsCommand>(msg.payload.clone()) {
        Ok(command) => command,
        Err(err) => {
            let name = msg.payload.get("command").and_then(|v| v.as_str());
            return match name {
                Some(name) if WsCommand::NAMES.contains(&name) => {
                    WsMessage::error(msg.id, 400, &format!("invalid {name} command: {err}"))
                }
                _ => WsMessage::error(msg.id, 404, "unknown command"),
            }
            .to_text();
        }
    };

    let payload = match command {
        WsCommand::Press { direction } => {
            let outcome = repeater.start(direction).await;
            if outcome.is_started() {
                held.press(direction, outcome.info().id);
            }
            serde_json::json!({
                "command": "press",
                "direction": direction,
                "started": outcome.is_started(),
                "repeat": outcome.info(),
            })
        }
        WsCommand::Release { direction } => {
            held.release(direction);
            let stopped = repeater.stop(direction).await.is_some();
            serde_json::json!({
                "command": "release",
                "direction": direction,
                "stopped": stopped,
            })
        }
        WsCommand::Tap { direction } => {
            if let Err(err) = repeater.publish_once(direction) {
                return WsMessage::error(msg.id, err.status_code().as_u16(), &err.to_string())
                    .to_text();
            }
            serde_json::json!({
                "command": "tap",
                "direction": direction,
                "published": true,
            })
        }
        WsCommand::ReleaseAll => {
            held.drain();
            let stopped = repeater.stop_all().await;
            serde_json::json!({
                "command": "release_all",
                "stopped": stopped,
            })
        }
    };

    WsMessage::new(msg.id, WsMessageType::Response, payload).to_text()
}
