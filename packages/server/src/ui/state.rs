//! Server state and connection management.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{ConnectionId, SessionRegistry, SessionRepository, Timestamp},
    infrastructure::repository::InMemorySessionRepository,
};

/// Client connection information
pub struct ClientInfo {
    /// Outbound message channel drained by the connection's send task
    pub sender: mpsc::UnboundedSender<String>,
    /// When the link was established
    pub connected_at: Timestamp,
}

/// Shared application state
pub struct AppState {
    /// Repository（データアクセス層の抽象化）
    pub repository: Arc<dyn SessionRepository>,
    /// WebSocket sender channels for delivery (shared with Repository)
    pub connected_clients: Arc<Mutex<HashMap<ConnectionId, ClientInfo>>>,
    /// Identifier echoed in ping replies
    pub server_id: String,
}

impl AppState {
    /// Fresh state with an empty in-memory registry
    pub fn new(server_id: impl Into<String>) -> Self {
        let connected_clients = Arc::new(Mutex::new(HashMap::new()));
        let registry = Arc::new(Mutex::new(SessionRegistry::new()));
        let repository = Arc::new(InMemorySessionRepository::new(
            connected_clients.clone(),
            registry,
        ));

        Self {
            repository,
            connected_clients,
            server_id: server_id.into(),
        }
    }
}
