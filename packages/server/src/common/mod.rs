//! Cross-cutting helpers for the server.

pub mod config;
