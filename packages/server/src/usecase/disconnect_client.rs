//! UseCase: クライアント切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - 切断時のセッション離脱と client-left の配信対象
//!
//! ### なぜこのテストが必要か
//! - 切断は理由を問わず正常な遷移であり、離脱処理は一度だけ実行される
//! - 切断した接続自身には client-left を送らない
//!
//! ### どのような状況を想定しているか
//! - 正常系：他メンバーがいるセッションからの切断
//! - エッジケース：最後のメンバーの切断、未参加のままの切断

use std::sync::Arc;

use crate::domain::{ConnectionId, SessionDeparture, SessionRepository};

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(SessionDeparture)` - 参加していたセッションと残りメンバー（client-left の配信対象）
    /// * `None` - どのセッションにも参加していなかった
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<SessionDeparture> {
        self.repository.remove_connection(connection_id).await
    }
}
