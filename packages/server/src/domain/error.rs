//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// SessionId validation error
    #[error("SessionId cannot be empty")]
    SessionIdEmpty,

    /// Event name outside the relayed set
    #[error("Unknown event name: {0}")]
    UnknownEventName(String),
}

/// Errors raised by the session repository
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A connection with the same id is already registered
    #[error("Connection '{0}' is already registered")]
    DuplicateConnection(String),
}
