use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    api::campaign::templates::{CampaignRedeemRequest, CampaignRedeemResponse},
    api::common::SimpleApiResponse,
    fingerprint::client_fingerprint,
    services::campaign_service::CampaignError,
    services::coupon_service::COUPON_TTL_HOURS,
    state::AppState,
};

/// POST /api/v1/campaign/redeem
///
/// Redeems a free campaign slot in exchange for a share or feedback
/// action and returns a single-use premium coupon.
///
/// Rejections:
/// - ALREADY_USED: this fingerprint already redeemed the free path
/// - CAMPAIGN_ENDED: all slots are gone
pub async fn handle_redeem(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CampaignRedeemRequest>,
) -> Result<Json<SimpleApiResponse<CampaignRedeemResponse>>, (StatusCode, Json<SimpleApiResponse<()>>)> {
    let fingerprint = client_fingerprint(&headers);

    // 1. Validate request
    let action = match request.validate() {
        Ok(action) => action,
        Err(e) => {
            warn!(fingerprint = %fingerprint, "❌ Validation failed: {}", e);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(SimpleApiResponse::<()>::error_with_code("VALIDATION_ERROR", &e)),
            ));
        }
    };

    info!(fingerprint = %fingerprint, action = ?action, "🎯 Campaign redeem request");

    // 2. Run the ledger
    let coupon_code = match state
        .campaign
        .redeem(&fingerprint, action, &request.action_data)
        .await
    {
        Ok(code) => code,
        Err(CampaignError::AlreadyUsed) => {
            return Err((
                StatusCode::CONFLICT,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "ALREADY_USED",
                    "This device already claimed the campaign.",
                )),
            ));
        }
        Err(CampaignError::CampaignEnded) => {
            return Err((
                StatusCode::GONE,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "CAMPAIGN_ENDED",
                    "The campaign has reached its limit. Thank you for the interest!",
                )),
            ));
        }
        Err(CampaignError::Store(e)) => {
            error!(fingerprint = %fingerprint, error = %e, "❌ Redeem failed on the store");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "INTERNAL_ERROR",
                    "Could not complete the redemption. Please retry.",
                )),
            ));
        }
    };

    Ok(Json(SimpleApiResponse::success_with_message(
        CampaignRedeemResponse {
            coupon_code,
            expires_in_hours: COUPON_TTL_HOURS,
        },
        "Thanks for the support! Your premium coupon is ready. 🎁".to_string(),
    )))
}
