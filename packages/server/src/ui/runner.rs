//! Server startup: router construction, listener binding and graceful shutdown.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{get_session_detail, health_check, list_sessions, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};
use crate::{common::config::ServerConfig, error::ServerError};

/// Build the application router for `state`.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Result<Router, ServerError> {
    let cors = config.cors_layer()?;

    Ok(Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket_handler))
        // Liveness
        .route("/health", get(health_check))
        // Introspection
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/{session_id}", get(get_session_detail))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Bind the configured address and serve until SIGINT/SIGTERM.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listen_address(),
            source,
        })?;

    serve(listener, config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = Arc::new(AppState::new(config.server_id.clone()));
    let app = build_router(state, &config)?;

    let local_addr = listener.local_addr().map_err(ServerError::Serve)?;
    tracing::info!("WebSocket server running on {}", local_addr);
    tracing::info!("Health check available at http://{}/health", local_addr);
    tracing::info!("Server id: {}", config.server_id);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!("Server closed");
    Ok(())
}
