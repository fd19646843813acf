//! Command handlers: start, stop, tap, and stop-all.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    CommandConfigResponse, PublishOnceResponse, StartResponse, StopAllResponse, StopResponse,
};
use crate::app_state::AppState;
use crate::domain::Direction;
use crate::error::{ErrorResponse, TeleopError};

/// `POST /commands/{direction}/start` — Start repeating a direction.
///
/// # Errors
///
/// Returns [`TeleopError::UnknownDirection`] for an unrecognised direction.
#[utoipa::path(
    post,
    path = "/api/v1/commands/{direction}/start",
    tag = "Commands",
    summary = "Start repeating a direction",
    description = "Publishes the direction's velocity command every repeat period until stopped. Starting a direction that is already repeating leaves the existing repeat in place.",
    params(
        ("direction" = String, Path, description = "forward, backward, turn_left or turn_right"),
    ),
    responses(
        (status = 200, description = "Repeat active", body = StartResponse),
        (status = 400, description = "Unknown direction", body = ErrorResponse),
    )
)]
pub async fn start_command(
    State(state): State<AppState>,
    Path(direction): Path<String>,
) -> Result<impl IntoResponse, TeleopError> {
    let direction: Direction = direction.parse()?;
    let outcome = state.repeater.start(direction).await;

    Ok(Json(StartResponse {
        started: outcome.is_started(),
        repeat: outcome.info().clone(),
    }))
}

/// `POST /commands/{direction}/stop` — Stop repeating a direction.
///
/// # Errors
///
/// Returns [`TeleopError::UnknownDirection`] for an unrecognised direction.
#[utoipa::path(
    post,
    path = "/api/v1/commands/{direction}/stop",
    tag = "Commands",
    summary = "Stop repeating a direction",
    description = "Cancels the direction's repeat. Stopping a direction that is not repeating is a no-op.",
    params(
        ("direction" = String, Path, description = "forward, backward, turn_left or turn_right"),
    ),
    responses(
        (status = 200, description = "Direction idle", body = StopResponse),
        (status = 400, description = "Unknown direction", body = ErrorResponse),
    )
)]
pub async fn stop_command(
    State(state): State<AppState>,
    Path(direction): Path<String>,
) -> Result<impl IntoResponse, TeleopError> {
    let direction: Direction = direction.parse()?;
    let repeat = state.repeater.stop(direction).await;

    Ok(Json(StopResponse {
        direction,
        stopped: repeat.is_some(),
        repeat,
    }))
}

/// `POST /commands/{direction}/once` — Publish a direction once.
///
/// # Errors
///
/// Returns [`TeleopError::UnknownDirection`] for an unrecognised direction
/// and [`TeleopError::Transport`] if the publish is rejected.
#[utoipa::path(
    post,
    path = "/api/v1/commands/{direction}/once",
    tag = "Commands",
    summary = "Publish a direction once",
    description = "Publishes a single instance of the direction's velocity command, independent of any repeat.",
    params(
        ("direction" = String, Path, description = "forward, backward, turn_left or turn_right"),
    ),
    responses(
        (status = 202, description = "Command handed to the transport", body = PublishOnceResponse),
        (status = 400, description = "Unknown direction", body = ErrorResponse),
        (status = 503, description = "Transport not connected", body = ErrorResponse),
    )
)]
pub async fn publish_once(
    State(state): State<AppState>,
    Path(direction): Path<String>,
) -> Result<impl IntoResponse, TeleopError> {
    let direction: Direction = direction.parse()?;
    state.repeater.publish_once(direction)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishOnceResponse {
            direction,
            command: *state.repeater.commands().get(direction),
            published_at: Utc::now(),
        }),
    ))
}

/// `POST /commands/stop-all` — Stop every repeat.
#[utoipa::path(
    post,
    path = "/api/v1/commands/stop-all",
    tag = "Commands",
    summary = "Stop all directions",
    description = "Cancels every active repeat.",
    responses(
        (status = 200, description = "All directions idle", body = StopAllResponse),
    )
)]
pub async fn stop_all(State(state): State<AppState>) -> impl IntoResponse {
    Json(StopAllResponse {
        stopped: state.repeater.stop_all().await,
    })
}

/// `GET /commands` — Command channel configuration.
#[utoipa::path(
    get,
    path = "/api/v1/commands",
    tag = "Commands",
    summary = "Command configuration",
    description = "Returns the topic, message type, repeat period, publish gate and the velocity command bound to each direction.",
    responses(
        (status = 200, description = "Command configuration", body = CommandConfigResponse),
    )
)]
pub async fn get_commands(State(state): State<AppState>) -> impl IntoResponse {
    let repeater = &state.repeater;
    Json(CommandConfigResponse {
        channel_name: repeater.channel().name().to_string(),
        schema_id: repeater.channel().schema_id().to_string(),
        repeat_period_ms: u64::try_from(repeater.period().as_millis()).unwrap_or(u64::MAX),
        publish_gate: repeater.gate(),
        commands: *repeater.commands(),
    })
}

/// Command routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/commands", get(get_commands))
        .route("/commands/stop-all", post(stop_all))
        .route("/commands/{direction}/start", post(start_command))
        .route("/commands/{direction}/stop", post(stop_command))
        .route("/commands/{direction}/once", post(publish_once))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::CommandSet;
    use crate::service::{CommandRepeater, ConnectionMonitor, PublishGate};
    use crate::transport::testing::RecordingTransport;
    use crate::transport::{CommandChannel, Transport};

    fn app(transport: Arc<RecordingTransport>) -> Router {
        let monitor = Arc::new(ConnectionMonitor::new());
        let channel = CommandChannel::new(
            transport as Arc<dyn Transport>,
            "/cmd_vel",
            "geometry_msgs/Twist",
        );
        let Ok(repeater) = CommandRepeater::new(
            channel,
            CommandSet::default(),
            Duration::from_millis(3000),
            PublishGate::Always,
            monitor.subscribe(),
        ) else {
            panic!("valid repeater");
        };
        routes().with_state(AppState {
            repeater: Arc::new(repeater),
            monitor,
        })
    }

    fn post_request(uri: &str) -> Request<Body> {
        let Ok(request) = Request::post(uri).body(Body::empty()) else {
            panic!("valid request");
        };
        request
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("readable body");
        };
        serde_json::from_slice(&bytes).unwrap_or_default()
    }

    #[tokio::test]
    async fn start_then_restart_reports_already_active() {
        let app = app(Arc::new(RecordingTransport::new(true)));

        let Ok(first) = app.clone().oneshot(post_request("/commands/forward/start")).await else {
            panic!("first start");
        };
        assert_eq!(first.status(), StatusCode::OK);
        let first = json_body(first).await;
        assert_eq!(first["started"], true);
        assert_eq!(first["repeat"]["direction"], "forward");
        assert_eq!(first["repeat"]["period_ms"], 3000);

        let Ok(second) = app.oneshot(post_request("/commands/up/start")).await else {
            panic!("second start");
        };
        let second = json_body(second).await;
        assert_eq!(second["started"], false);
        assert_eq!(second["repeat"]["id"], first["repeat"]["id"]);
    }

    #[tokio::test]
    async fn stop_without_start_is_ok() {
        let app = app(Arc::new(RecordingTransport::new(true)));

        let Ok(response) = app.oneshot(post_request("/commands/turn_left/stop")).await else {
            panic!("stop");
        };
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["stopped"], false);
        assert!(body.get("repeat").is_none());
    }

    #[tokio::test]
    async fn unknown_direction_is_structured_400() {
        let app = app(Arc::new(RecordingTransport::new(true)));

        let Ok(response) = app.oneshot(post_request("/commands/sideways/start")).await else {
            panic!("start");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn once_publishes_or_reports_unavailable() {
        let transport = Arc::new(RecordingTransport::new(true));
        let app = app(Arc::clone(&transport));

        let Ok(response) = app
            .clone()
            .oneshot(post_request("/commands/turn_right/once"))
            .await
        else {
            panic!("once");
        };
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(transport.count(), 1);

        transport.set_connected(false);
        let Ok(response) = app.oneshot(post_request("/commands/turn_right/once")).await else {
            panic!("once");
        };
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(transport.count(), 1);
    }

    #[tokio::test]
    async fn stop_all_counts_active_repeats() {
        let app = app(Arc::new(RecordingTransport::new(true)));

        for uri in ["/commands/forward/start", "/commands/turn_left/start"] {
            let Ok(response) = app.clone().oneshot(post_request(uri)).await else {
                panic!("start");
            };
            assert_eq!(response.status(), StatusCode::OK);
        }

        let Ok(response) = app.oneshot(post_request("/commands/stop-all")).await else {
            panic!("stop-all");
        };
        let body = json_body(response).await;
        assert_eq!(body["stopped"], 2);
    }
}
