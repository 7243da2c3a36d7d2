//! Health and status handlers

use crate::api::rest::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
    })
}

/// Daemon status response
#[derive(Debug, Serialize, Deserialize)]
pub struct DaemonStatusResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub storage: StorageStatus,
}

/// Storage backend status
#[derive(Debug, Serialize, Deserialize)]
pub struct StorageStatus {
    pub backend: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Daemon status endpoint
pub async fn daemon_status(State(state): State<AppState>) -> Json<DaemonStatusResponse> {
    let storage = match state.storage.ping().await {
        Ok(()) => match state.storage.count_pages().await {
            Ok(total) => StorageStatus {
                backend: state.storage.backend().to_string(),
                reachable: true,
                total_pages: Some(total),
                error: None,
            },
            Err(e) => StorageStatus {
                backend: state.storage.backend().to_string(),
                reachable: true,
                total_pages: None,
                error: Some(e.to_string()),
            },
        },
        Err(e) => {
            tracing::warn!(error = %e, "Storage unreachable");
            StorageStatus {
                backend: state.storage.backend().to_string(),
                reachable: false,
                total_pages: None,
                error: Some(e.to_string()),
            }
        }
    };

    let status = if storage.reachable && storage.error.is_none() {
        "healthy"
    } else {
        "degraded"
    };

    Json(DaemonStatusResponse {
        status: status.to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
        started_at: state.started_at,
        storage,
    })
}
