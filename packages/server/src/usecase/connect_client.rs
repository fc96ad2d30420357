//! UseCase: クライアント接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::execute() メソッド
//! - 接続の登録（重複チェック）
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続の登録（セッションには未参加のまま）
//! - 異常系：同じ接続 ID の二重登録

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::domain::{ConnectionId, RepositoryError, SessionRepository, Timestamp};

use super::error::ConnectError;

/// クライアント接続のユースケース
pub struct ConnectClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 接続を登録する
    ///
    /// 登録直後の接続はどのセッションにも属さない（Unjoined）。
    ///
    /// # Returns
    ///
    /// * `Ok(Timestamp)` - 接続時刻
    /// * `Err(ConnectError)` - 接続失敗
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        sender: UnboundedSender<String>,
    ) -> Result<Timestamp, ConnectError> {
        let connected_at = Timestamp::now();
        self.repository
            .add_connection(connection_id, sender, connected_at)
            .await
            .map_err(|e| match e {
                RepositoryError::DuplicateConnection(id) => ConnectError::DuplicateConnectionId(id),
            })?;

        Ok(connected_at)
    }
}
