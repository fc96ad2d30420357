//! UseCase 層
//!
//! 中継のプロトコル処理を実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod connect_client;
pub mod disconnect_client;
pub mod error;
pub mod get_server_status;
pub mod join_session;
pub mod relay_event;

pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{ConnectError, JoinSessionError, RelayEventError};
pub use get_server_status::{GetServerStatusUseCase, ServerStatus};
pub use join_session::JoinSessionUseCase;
pub use relay_event::{RelayEventUseCase, RelayOutcome};
