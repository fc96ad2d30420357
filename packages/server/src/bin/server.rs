//! WebSocket session relay server.
//!
//! Clients join a session and the server forwards their events to every other
//! member of that session.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin pairlink-server -- --port 3001
//! ```

use pairlink_server::ServerConfig;
use pairlink_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::load();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = pairlink_server::run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
