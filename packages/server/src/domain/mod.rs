//! Domain layer for the relay.
//!
//! This module contains membership rules that are independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use entity::{JoinTransition, SessionDeparture, SessionRegistry, SessionSnapshot};
pub use error::{RepositoryError, ValueObjectError};
pub use factory::ConnectionIdFactory;
#[cfg(test)]
pub use repository::MockSessionRepository;
pub use repository::SessionRepository;
pub use value_object::{ConnectionId, RelayEventKind, SessionId, Timestamp};
