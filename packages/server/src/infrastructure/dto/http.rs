//! HTTP API response DTOs for the relay.

use serde::{Deserialize, Serialize};

/// Liveness report for `/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    pub status: String,
    pub timestamp: String, // ISO 8601
    pub connections: usize,
    pub active_sessions: usize,
}

/// Session summary for list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummaryDto {
    pub id: String,
    pub members: Vec<String>,
}

/// Session detail for detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetailDto {
    pub id: String,
    pub members: Vec<MemberDetailDto>,
}

/// Member detail for session detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetailDto {
    pub client_id: String,
    pub connected_at: String, // ISO 8601
}
