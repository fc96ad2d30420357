//! Repository trait for connection and session membership state.
//!
//! The UseCase layer depends on this trait only; the concrete storage lives in
//! the infrastructure layer.

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::{
    ConnectionId, JoinTransition, RepositoryError, SessionDeparture, SessionId, SessionSnapshot,
    Timestamp,
};

/// Owner of the connection table and the session registry.
///
/// Every method is atomic with respect to concurrent callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Register a newly established connection and its outbound channel.
    async fn add_connection(
        &self,
        connection_id: ConnectionId,
        sender: UnboundedSender<String>,
        connected_at: Timestamp,
    ) -> Result<(), RepositoryError>;

    /// Leave the current session and drop the connection's outbound channel.
    async fn remove_connection(&self, connection_id: &ConnectionId) -> Option<SessionDeparture>;

    /// Join `session_id`, leaving any other session first.
    async fn join(&self, connection_id: &ConnectionId, session_id: SessionId) -> JoinTransition;

    /// Current members of a session; empty when it does not exist.
    async fn members_of(&self, session_id: &SessionId) -> Vec<ConnectionId>;

    /// Session the connection currently belongs to.
    async fn current_session(&self, connection_id: &ConnectionId) -> Option<SessionId>;

    /// Number of non-empty sessions.
    async fn session_count(&self) -> usize;

    /// Number of registered connections.
    async fn count_connected_clients(&self) -> usize;

    /// Every non-empty session with its members, sorted by id.
    async fn list_sessions(&self) -> Vec<SessionSnapshot>;
}
