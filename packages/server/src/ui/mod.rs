//! WebSocket relay server implementation.

mod handler;
mod runner;
mod signal;
pub mod state; // UseCase 層からアクセスするため public

pub use runner::{build_router, run, serve};
pub use signal::shutdown_signal;
