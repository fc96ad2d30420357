//! UseCase: ドメインイベント中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayEventUseCase::execute() メソッド
//! - ペイロード検証、配信対象の選定（送信者を除外）、受信時刻の付与
//!
//! ### なぜこのテストが必要か
//! - 中継はペイロードを解釈しないが、sessionId だけは必須
//! - 送信者自身にイベントが返ってはならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：同じセッションの他メンバーへの中継
//! - 異常系：オブジェクトでないペイロード、sessionId の欠落
//! - エッジケース：送信者しかいないセッション、送信者が属さないセッション

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::{ConnectionId, SessionId, SessionRepository, Timestamp};

use super::error::RelayEventError;

/// Field every relayed payload must carry
const SESSION_ID_FIELD: &str = "sessionId";
/// Field stamped by the server on every relayed payload
const TIMESTAMP_FIELD: &str = "timestamp";

/// 中継結果
#[derive(Debug, Clone, PartialEq)]
pub struct RelayOutcome {
    pub session_id: SessionId,
    /// 配信対象（送信者を除くセッションメンバー）。空なら何もしない
    pub targets: Vec<ConnectionId>,
    /// 元のペイロード + サーバー受信時刻
    pub payload: Value,
}

/// ドメインイベント中継のユースケース
pub struct RelayEventUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl RelayEventUseCase {
    /// 新しい RelayEventUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 中継を実行
    ///
    /// # Arguments
    ///
    /// * `from` - 送信元の接続
    /// * `payload` - クライアントから受け取った data
    ///
    /// # Returns
    ///
    /// * `Ok(RelayOutcome)` - 配信対象と配信するペイロード
    /// * `Err(RelayEventError)` - 不正なペイロード（破棄される）
    pub async fn execute(
        &self,
        from: &ConnectionId,
        payload: Value,
    ) -> Result<RelayOutcome, RelayEventError> {
        let Value::Object(mut fields) = payload else {
            return Err(RelayEventError::NotAnObject(payload.to_string()));
        };
        let session_id = extract_session_id(&fields)?;

        let targets = self.get_broadcast_targets(from, &session_id).await;

        fields.insert(
            TIMESTAMP_FIELD.to_string(),
            Value::String(Timestamp::now().to_rfc3339()),
        );

        Ok(RelayOutcome {
            session_id,
            targets,
            payload: Value::Object(fields),
        })
    }

    /// 送信者がメンバーである場合に限り、送信者以外のメンバーを返す
    async fn get_broadcast_targets(
        &self,
        from: &ConnectionId,
        session_id: &SessionId,
    ) -> Vec<ConnectionId> {
        if self.repository.current_session(from).await.as_ref() != Some(session_id) {
            return Vec::new();
        }
        self.repository
            .members_of(session_id)
            .await
            .into_iter()
            .filter(|member| member != from)
            .collect()
    }
}

fn extract_session_id(fields: &Map<String, Value>) -> Result<SessionId, RelayEventError> {
    let missing = || RelayEventError::MissingSessionId(Value::Object(fields.clone()).to_string());
    match fields.get(SESSION_ID_FIELD) {
        Some(Value::String(raw)) => SessionId::new(raw.clone()).map_err(|_| missing()),
        _ => Err(missing()),
    }
}
