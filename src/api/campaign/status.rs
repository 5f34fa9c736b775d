use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    api::campaign::templates::CampaignStatusResponse,
    api::common::SimpleApiResponse,
    fingerprint::client_fingerprint,
    state::AppState,
};

/// GET /api/v1/campaign/status
///
/// Ledger snapshot for the requesting fingerprint: remaining slots and
/// whether this client can still redeem. Read-only.
pub async fn handle_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SimpleApiResponse<CampaignStatusResponse>>, (StatusCode, Json<SimpleApiResponse<()>>)> {
    let fingerprint = client_fingerprint(&headers);

    let status = state.campaign.status(&fingerprint).await.map_err(|e| {
        error!(fingerprint = %fingerprint, error = %e, "❌ Failed to read campaign status");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SimpleApiResponse::<()>::error_with_code(
                "INTERNAL_ERROR",
                "Failed to read campaign status",
            )),
        )
    })?;

    info!(
        fingerprint = %fingerprint,
        remaining = status.remaining,
        eligible = status.user_eligible,
        "📊 Campaign status request"
    );

    Ok(Json(SimpleApiResponse::success(CampaignStatusResponse {
        remaining: status.remaining,
        active: status.active,
        user_eligible: status.user_eligible,
    })))
}
