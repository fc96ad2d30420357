//! Shared utilities for the Pairlink server and client binaries.

pub mod logger;
pub mod time;
