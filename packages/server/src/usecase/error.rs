//! UseCase 層のエラー定義

use thiserror::Error;

/// 接続登録のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Connection '{0}' is already registered")]
    DuplicateConnectionId(String),
}

/// join-session のエラー（不正入力）
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinSessionError {
    #[error("Invalid sessionId provided: {0}")]
    InvalidSessionId(String),
}

/// ドメインイベント中継のエラー（不正入力）
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayEventError {
    #[error("payload must be a JSON object (got: {0})")]
    NotAnObject(String),

    #[error("payload is missing a non-empty sessionId (got: {0})")]
    MissingSessionId(String),
}
