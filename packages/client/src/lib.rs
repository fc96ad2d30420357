//! Command-line client for the Pairlink relay.
//!
//! Provides a scripted smoke test that pairs a phone and a display through a
//! running server, and an interactive prompt for emitting events by hand.

pub mod connection;
pub mod error;
pub mod repl;
pub mod smoke;

pub use connection::RelayConnection;
pub use error::ClientError;
pub use repl::run_repl;
pub use smoke::{SmokeReport, SmokeTest};
