//! teleop-gateway server entry point.
//!
//! Connects to rosbridge and starts the Axum HTTP server with the control
//! page, REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use teleop_gateway::api;
use teleop_gateway::app_state::AppState;
use teleop_gateway::config::TeleopConfig;
use teleop_gateway::domain::EventBus;
use teleop_gateway::service::{CommandRepeater, ConnectionMonitor};
use teleop_gateway::transport::{
    CommandChannel, RosbridgeOptions, RosbridgeTransport, Transport,
};
use teleop_gateway::ui;
use teleop_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (and `.env`) before tracing so LOG_FORMAT applies
    let config = TeleopConfig::from_env()?;
    init_tracing();
    tracing::info!(
        addr = %config.listen_addr,
        endpoint = %config.endpoint,
        topic = %config.channel_name,
        "starting teleop-gateway"
    );

    // Lifecycle plumbing: the monitor subscribes before the transport can emit
    let event_bus = EventBus::new(config.event_bus_capacity);
    let monitor = Arc::new(ConnectionMonitor::new());
    let monitor_task = {
        let monitor = Arc::clone(&monitor);
        let events = event_bus.subscribe();
        tokio::spawn(async move { monitor.run(events).await })
    };

    // Transport layer
    let (transport, worker) = RosbridgeTransport::spawn(
        RosbridgeOptions {
            endpoint: config.endpoint.clone(),
            reconnect_delay: config.reconnect_delay(),
        },
        event_bus.clone(),
    );
    let transport = Arc::new(transport);
    let channel = CommandChannel::new(
        Arc::clone(&transport) as Arc<dyn Transport>,
        &config.channel_name,
        &config.schema_id,
    );

    // Service layer
    let repeater = Arc::new(CommandRepeater::new(
        channel,
        config.commands,
        config.repeat_period(),
        config.publish_gate,
        monitor.subscribe(),
    )?);

    // Build application state
    let app_state = AppState {
        repeater: Arc::clone(&repeater),
        monitor,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .merge(ui::routes())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;
        app.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain: stop every repeat, then close the bridge session
    let stopped = repeater.stop_all().await;
    tracing::info!(stopped, "repeats stopped; closing rosbridge transport");
    transport.close();
    if let Err(err) = worker.await {
        tracing::warn!(error = %err, "rosbridge worker ended abnormally");
    }
    drop(event_bus);
    if let Err(err) = monitor_task.await {
        tracing::warn!(error = %err, "connection monitor ended abnormally");
    }

    Ok(())
}

/// Installs the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
