//! Operator surface end to end: REST, control page and `/ws` over a real
//! listener, with an in-memory transport standing in for rosbridge.
#![allow(clippy::panic, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use teleop_gateway::api;
use teleop_gateway::app_state::AppState;
use teleop_gateway::domain::{CommandSet, Direction};
use teleop_gateway::error::TransportError;
use teleop_gateway::service::{CommandRepeater, ConnectionMonitor, PublishGate};
use teleop_gateway::transport::{CommandChannel, Transport};
use teleop_gateway::ui;
use teleop_gateway::ws::handler::ws_handler;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct MemoryTransport {
    connected: AtomicBool,
    published: Mutex<Vec<(String, Value)>>,
}

impl MemoryTransport {
    fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            published: Mutex::new(Vec::new()),
        }
    }

    fn count(&self) -> usize {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Transport for MemoryTransport {
    fn publish(&self, channel: &str, _schema_id: &str, payload: Value) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel.to_string(), payload));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

struct Gateway {
    addr: SocketAddr,
    transport: Arc<MemoryTransport>,
    monitor: Arc<ConnectionMonitor>,
    repeater: Arc<CommandRepeater>,
}

impl Gateway {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

async fn spawn_gateway() -> Gateway {
    let transport = Arc::new(MemoryTransport::new());
    let monitor = Arc::new(ConnectionMonitor::new());
    let channel = CommandChannel::new(
        Arc::clone(&transport) as Arc<dyn Transport>,
        "/cmd_vel",
        "geometry_msgs/Twist",
    );
    let Ok(repeater) = CommandRepeater::new(
        channel,
        CommandSet::default(),
        Duration::from_millis(50),
        PublishGate::Always,
        monitor.subscribe(),
    ) else {
        panic!("valid repeater");
    };
    let repeater = Arc::new(repeater);

    let app = Router::new()
        .merge(api::build_router())
        .merge(ui::routes())
        .route("/ws", get(ws_handler))
        .with_state(AppState {
            repeater: Arc::clone(&repeater),
            monitor: Arc::clone(&monitor),
        });

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind gateway");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("gateway address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Gateway {
        addr,
        transport,
        monitor,
        repeater,
    }
}

async fn get_json(url: &str) -> Value {
    let Ok(response) = reqwest::get(url).await else {
        panic!("GET {url}");
    };
    let Ok(body) = response.json::<Value>().await else {
        panic!("JSON body from {url}");
    };
    body
}

async fn post(url: &str) -> (u16, Value) {
    let Ok(response) = reqwest::Client::new().post(url).send().await else {
        panic!("POST {url}");
    };
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or_default();
    (status, body)
}

#[tokio::test]
async fn health_and_control_page() {
    let gateway = spawn_gateway().await;

    let health = get_json(&gateway.url("/health")).await;
    assert_eq!(health["status"], "healthy");

    let Ok(response) = reqwest::get(gateway.url("/")).await else {
        panic!("GET /");
    };
    assert_eq!(response.status().as_u16(), 200);
    let Ok(page) = response.text().await else {
        panic!("page body");
    };
    assert!(page.contains("data-direction=\"forward\""));
}

#[tokio::test]
async fn status_reflects_monitor_and_repeats() {
    let gateway = spawn_gateway().await;

    let status = get_json(&gateway.url("/api/v1/status")).await;
    assert_eq!(status["connection"]["state"], "connecting");
    assert_eq!(status["active"], json!([]));

    gateway.monitor.on_error("");
    let status = get_json(&gateway.url("/api/v1/status")).await;
    assert_eq!(status["connection"]["state"], "errored");
    assert_eq!(status["connection"]["detail"], "unknown transport error");

    gateway.monitor.on_connected();
    let (code, _) = post(&gateway.url("/api/v1/commands/backward/start")).await;
    assert_eq!(code, 200);

    let status = get_json(&gateway.url("/api/v1/status")).await;
    assert_eq!(status["connection"]["state"], "connected");
    assert!(status["connection"].get("detail").is_none());
    assert_eq!(status["active"][0]["direction"], "backward");

    let (code, body) = post(&gateway.url("/api/v1/commands/backward/stop")).await;
    assert_eq!(code, 200);
    assert_eq!(body["stopped"], true);
}

#[tokio::test]
async fn command_configuration_is_exposed() {
    let gateway = spawn_gateway().await;

    let config = get_json(&gateway.url("/api/v1/commands")).await;
    assert_eq!(config["channel_name"], "/cmd_vel");
    assert_eq!(config["schema_id"], "geometry_msgs/Twist");
    assert_eq!(config["repeat_period_ms"], 50);
    assert_eq!(config["commands"]["forward"]["linear"]["x"], 0.5);
}

#[tokio::test]
async fn websocket_press_release_and_dead_man() {
    let gateway = spawn_gateway().await;
    let url = format!("ws://{}/ws", gateway.addr);

    let Ok((mut socket, _)) = connect_async(url.as_str()).await else {
        panic!("connect operator ws");
    };

    let first = next_json(&mut socket).await;
    assert_eq!(first["type"], "event");
    assert_eq!(first["payload"]["event_type"], "connection_status");
    assert_eq!(first["payload"]["status"]["state"], "connecting");

    gateway.monitor.on_connected();
    let event = next_json(&mut socket).await;
    assert_eq!(event["payload"]["status"]["state"], "connected");

    send_command(&mut socket, "1", json!({"command": "press", "direction": "forward"})).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["id"], "1");
    assert_eq!(reply["payload"]["started"], true);

    send_command(&mut socket, "2", json!({"command": "release", "direction": "forward"})).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["payload"]["stopped"], true);
    assert!(!gateway.repeater.is_active(Direction::Forward).await);

    send_command(&mut socket, "3", json!({"command": "jump"})).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], 404);

    send_command(&mut socket, "4", json!({"command": "press", "direction": "sideways"})).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["payload"]["code"], 400);

    send_command(&mut socket, "5", json!({"command": "press", "direction": "turn_right"})).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["payload"]["started"], true);

    // Dropping the socket while holding releases the control.
    let _ = socket.close(None).await;
    drop(socket);
    let released = tokio::time::timeout(WAIT, async {
        while gateway.repeater.is_active(Direction::TurnRight).await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(released.is_ok(), "held direction should be released on disconnect");

    let settled = gateway.transport.count();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(gateway.transport.count(), settled);
}

#[tokio::test]
async fn disconnect_leaves_repeats_started_elsewhere() {
    let gateway = spawn_gateway().await;
    let (code, body) = post(&gateway.url("/api/v1/commands/forward/start")).await;
    assert_eq!(code, 200);
    let rest_repeat = body["repeat"]["id"].clone();

    let url = format!("ws://{}/ws", gateway.addr);
    let Ok((mut socket, _)) = connect_async(url.as_str()).await else {
        panic!("connect operator ws");
    };
    let _status = next_json(&mut socket).await;

    send_command(&mut socket, "1", json!({"command": "press", "direction": "forward"})).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["payload"]["started"], false);
    assert_eq!(reply["payload"]["repeat"]["id"], rest_repeat);

    send_command(&mut socket, "2", json!({"command": "press", "direction": "backward"})).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["payload"]["started"], true);

    let _ = socket.close(None).await;
    drop(socket);
    let released = tokio::time::timeout(WAIT, async {
        while gateway.repeater.is_active(Direction::Backward).await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(released.is_ok(), "the operator's own repeat should be released");

    assert!(gateway.repeater.is_active(Direction::Forward).await);
    let status = get_json(&gateway.url("/api/v1/status")).await;
    assert_eq!(status["active"][0]["id"], rest_repeat);
}

#[tokio::test]
async fn websocket_tap_publishes_once() {
    let gateway = spawn_gateway().await;
    let url = format!("ws://{}/ws", gateway.addr);
    let Ok((mut socket, _)) = connect_async(url.as_str()).await else {
        panic!("connect operator ws");
    };
    let _status = next_json(&mut socket).await;

    send_command(&mut socket, "t", json!({"command": "tap", "direction": "turn_left"})).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["payload"]["published"], true);
    assert_eq!(gateway.transport.count(), 1);
    assert!(!gateway.repeater.is_active(Direction::TurnLeft).await);

    gateway.transport.connected.store(false, Ordering::SeqCst);
    send_command(&mut socket, "u", json!({"command": "tap", "direction": "turn_left"})).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], 503);
}

type Client = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn send_command(socket: &mut Client, id: &str, payload: Value) {
    let envelope = json!({
        "id": id,
        "type": "command",
        "timestamp": chrono::Utc::now(),
        "payload": payload,
    });
    let sent = socket.send(Message::text(envelope.to_string())).await;
    assert!(sent.is_ok());
}

async fn next_json(socket: &mut Client) -> Value {
    loop {
        let Ok(Some(Ok(frame))) = tokio::time::timeout(WAIT, socket.next()).await else {
            panic!("expected a frame from the gateway");
        };
        if let Message::Text(text) = frame {
            let Ok(value) = serde_json::from_str(text.as_str()) else {
                panic!("gateway sent invalid JSON");
            };
            return value;
        }
    }
}
