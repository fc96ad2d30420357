//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use pairlink_shared::time::now_rfc3339;

use crate::{
    domain::SessionId,
    infrastructure::dto::http::{HealthDto, MemberDetailDto, SessionDetailDto, SessionSummaryDto},
    ui::state::AppState,
    usecase::GetServerStatusUseCase,
};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    let status = GetServerStatusUseCase::new(state.repository.clone())
        .execute()
        .await;

    Json(HealthDto {
        status: "healthy".to_string(),
        timestamp: now_rfc3339(),
        connections: status.connections,
        active_sessions: status.active_sessions,
    })
}

/// Get list of active sessions
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummaryDto>> {
    let sessions = state.repository.list_sessions().await;

    Json(
        sessions
            .into_iter()
            .map(|session| SessionSummaryDto {
                id: session.id.into_string(),
                members: session
                    .members
                    .into_iter()
                    .map(|member| member.into_string())
                    .collect(),
            })
            .collect(),
    )
}

/// Get session detail by ID
pub async fn get_session_detail(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDetailDto>, StatusCode> {
    let session_id = SessionId::new(session_id).map_err(|_| StatusCode::NOT_FOUND)?;

    let members = state.repository.members_of(&session_id).await;
    if members.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }

    let clients = state.connected_clients.lock().await;
    let members = members
        .into_iter()
        .map(|member| MemberDetailDto {
            connected_at: clients
                .get(&member)
                .map(|info| info.connected_at.to_rfc3339())
                .unwrap_or_default(),
            client_id: member.into_string(),
        })
        .collect();

    Ok(Json(SessionDetailDto {
        id: session_id.into_string(),
        members,
    }))
}
