//! Client error definitions.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("failed to encode or decode event: {0}")]
    Json(#[from] serde_json::Error),

    #[error("connection closed by server")]
    Closed,

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("unexpected message: {0}")]
    Unexpected(String),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}
