//! UseCase: セッション参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinSessionUseCase::execute() メソッド
//! - sessionId の検証と、参加通知の配信対象の選定
//!
//! ### なぜこのテストが必要か
//! - 別セッションへの再参加は「旧セッションから抜けて新セッションへ入る」一回の遷移
//! - 同じセッションへの再参加でも client-joined は再通知される
//!
//! ### どのような状況を想定しているか
//! - 正常系：初回参加、既存メンバーがいるセッションへの参加
//! - 異常系：空文字列・文字列以外の sessionId
//! - エッジケース：同じセッションへの再参加

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{ConnectionId, JoinTransition, SessionId, SessionRepository};

use super::error::JoinSessionError;

/// セッション参加のユースケース
pub struct JoinSessionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl JoinSessionUseCase {
    /// 新しい JoinSessionUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// セッション参加を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 参加する接続
    /// * `payload` - join-session の data（非空の文字列であること）
    ///
    /// # Returns
    ///
    /// * `Ok(JoinTransition)` - 参加後の状態（`peers` が client-joined の配信対象）
    /// * `Err(JoinSessionError)` - 不正な sessionId（レジストリは変更されない）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        payload: &Value,
    ) -> Result<JoinTransition, JoinSessionError> {
        let session_id = match payload {
            Value::String(raw) => SessionId::new(raw.clone())
                .map_err(|_| JoinSessionError::InvalidSessionId(payload.to_string()))?,
            other => return Err(JoinSessionError::InvalidSessionId(other.to_string())),
        };

        Ok(self.repository.join(connection_id, session_id).await)
    }
}
