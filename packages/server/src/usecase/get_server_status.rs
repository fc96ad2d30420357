//! UseCase: サーバー状態の取得（ヘルスチェック用）

use std::sync::Arc;

use crate::domain::SessionRepository;

/// ヘルスチェックで返す集計値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerStatus {
    /// 接続中のクライアント数
    pub connections: usize,
    /// メンバーが一人以上いるセッション数
    pub active_sessions: usize,
}

/// サーバー状態取得のユースケース
pub struct GetServerStatusUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl GetServerStatusUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> ServerStatus {
        ServerStatus {
            connections: self.repository.count_connected_clients().await,
            active_sessions: self.repository.session_count().await,
        }
    }
}
