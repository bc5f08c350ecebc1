//! Health check handler

use std::sync::Arc;

use axum::extract::State;
use chrono::Utc;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ok};

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
    /// "postgres" or "memory"
    #[schema(example = "postgres")]
    pub storage: String,
}

/// Health check endpoint
///
/// Pings PostgreSQL when it backs the ledger. Does NOT expose any internal
/// details in the response.
///
/// - Healthy: 200 OK + {code: 0, data: {timestamp_ms, storage}}
/// - Unhealthy: 503 Service Unavailable + {code: 5001, msg: "unavailable"}
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    let storage = match state.db {
        Some(ref db) => {
            if let Err(e) = db.health_check().await {
                tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
                return Err(ApiError::service_unavailable("unavailable"));
            }
            "postgres"
        }
        None => "memory",
    };

    ok(HealthResponse {
        timestamp_ms: Utc::now().timestamp_millis(),
        storage: storage.to_string(),
    })
}
