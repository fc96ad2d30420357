//! WebSocket session relay library.
//!
//! Clients connect over WebSocket, join a named session, and every event they
//! emit is forwarded to the other members of that session.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
pub mod error;

// Re-export entry points
pub use common::config::ServerConfig;
pub use error::ServerError;
pub use ui::{build_router, run, serve};
