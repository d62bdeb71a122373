// Framework bootstrap for the match server runtime.

use crate::domain::content::ContentDb;
use crate::frameworks::config;
use crate::interface_adapters::clients::auth::AuthClient;
use crate::interface_adapters::clients::results::ResultsClient;
use crate::interface_adapters::net::{create_room_handler, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{RoomRegistry, RoomSettings};

use axum::{
    Router,
    routing::{get, post},
};
use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state()?;
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/rooms", post(create_room_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Result<Arc<AppState>> {
    let auth_base_url = config::auth_service_url();
    let auth_verify_timeout = config::auth_verify_timeout();
    let auth_client = AuthClient::new(auth_base_url.clone(), auth_verify_timeout)
        .map_err(|e| std::io::Error::other(format!("failed to initialize auth client: {e}")))?;
    tracing::debug!(
        auth_base_url = %auth_base_url,
        auth_verify_timeout_ms = auth_verify_timeout.as_millis(),
        "auth client configured"
    );

    let results_client =
        ResultsClient::new(config::results_service_url(), config::results_report_timeout())
            .map_err(|e| {
                std::io::Error::other(format!("failed to initialize results client: {e}"))
            })?;

    // Room registry owns the set of active match tasks. Rooms are created on
    // demand by the matchmaking service via POST /rooms.
    let content = Arc::new(ContentDb::builtin());
    let room_registry = Arc::new(RoomRegistry::new(
        RoomSettings {
            command_channel_capacity: config::COMMAND_CHANNEL_CAPACITY,
            broadcast_capacity: config::BROADCAST_CAPACITY,
            tick_interval: config::TICK_INTERVAL,
        },
        content,
    ));

    Ok(Arc::new(AppState {
        room_registry,
        auth_client: Arc::new(auth_client),
        results_client: Arc::new(results_client),
    }))
}
