//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! 接続テーブル（HashMap）と SessionRegistry をインメモリ DB として使用します。
//!
//! ロック順序は常に registry → connected_clients です。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::UnboundedSender};

use crate::{
    domain::{
        ConnectionId, JoinTransition, RepositoryError, SessionDeparture, SessionId,
        SessionRegistry, SessionRepository, SessionSnapshot, Timestamp,
    },
    ui::state::ClientInfo,
};

/// インメモリ Session Repository 実装
pub struct InMemorySessionRepository {
    /// 接続中のクライアント情報（WebSocket sender を含む）
    connected_clients: Arc<Mutex<HashMap<ConnectionId, ClientInfo>>>,
    /// セッションのメンバーシップ
    registry: Arc<Mutex<SessionRegistry>>,
}

impl InMemorySessionRepository {
    /// 新しい InMemorySessionRepository を作成
    pub fn new(
        connected_clients: Arc<Mutex<HashMap<ConnectionId, ClientInfo>>>,
        registry: Arc<Mutex<SessionRegistry>>,
    ) -> Self {
        Self {
            connected_clients,
            registry,
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn add_connection(
        &self,
        connection_id: ConnectionId,
        sender: UnboundedSender<String>,
        connected_at: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut clients = self.connected_clients.lock().await;
        if clients.contains_key(&connection_id) {
            return Err(RepositoryError::DuplicateConnection(
                connection_id.into_string(),
            ));
        }
        clients.insert(
            connection_id,
            ClientInfo {
                sender,
                connected_at,
            },
        );
        Ok(())
    }

    async fn remove_connection(&self, connection_id: &ConnectionId) -> Option<SessionDeparture> {
        let mut registry = self.registry.lock().await;
        let departure = registry.leave(connection_id);
        self.connected_clients.lock().await.remove(connection_id);
        departure
    }

    async fn join(&self, connection_id: &ConnectionId, session_id: SessionId) -> JoinTransition {
        let mut registry = self.registry.lock().await;
        registry.join(connection_id.clone(), session_id)
    }

    async fn members_of(&self, session_id: &SessionId) -> Vec<ConnectionId> {
        let registry = self.registry.lock().await;
        registry.members_of(session_id)
    }

    async fn current_session(&self, connection_id: &ConnectionId) -> Option<SessionId> {
        let registry = self.registry.lock().await;
        registry.current_session(connection_id).cloned()
    }

    async fn session_count(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.session_count()
    }

    async fn count_connected_clients(&self) -> usize {
        let clients = self.connected_clients.lock().await;
        clients.len()
    }

    async fn list_sessions(&self) -> Vec<SessionSnapshot> {
        let registry = self.registry.lock().await;
        registry.snapshots()
    }
}
