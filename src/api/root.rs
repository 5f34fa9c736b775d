use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::state::AppState;

// ============================================================================
// RESPONSE MODELS
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub redis: &'static str,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /
pub async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        service: "twinpersona_ws",
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /health
///
/// Liveness plus a Redis ping. Reports degraded instead of failing the
/// probe outright; the campaign endpoints surface their own store errors.
pub async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let redis = match state.redis.health_check().await {
        Ok(_) => "up",
        Err(e) => {
            warn!(error = %e, "⚠️ Redis health check failed");
            "down"
        }
    };

    Json(HealthResponse {
        status: if redis == "up" { "ok" } else { "degraded" },
        redis,
    })
}
