use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    api::campaign::templates::CampaignRedeemRequest,
    api::common::SimpleApiResponse,
    fingerprint::client_fingerprint,
    services::campaign_service::{CampaignError, CampaignPath},
    services::stripe_service::PaymentError,
    state::AppState,
};

// ============================================================================
// REQUEST/RESPONSE MODELS
// ============================================================================

/// Refund-path redemption: a paid user hands in the same share/feedback
/// action and gets the ¥500 charge refunded.
#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub payment_intent_id: String,
    pub action: String,
    #[serde(default)]
    pub action_data: Value,
}

#[derive(Debug, Serialize)]
pub struct RefundResponse {
    pub refund_id: String,
    pub payment_intent_id: String,
}

// ============================================================================
// HANDLER
// ============================================================================

/// POST /api/v1/payment/refund
///
/// Runs the refund-namespace campaign path: admission gates first, then
/// the provider refund, then the ledger record. A provider failure after
/// admission hands the slot back.
pub async fn handle_refund(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<RefundRequest>,
) -> Result<Json<SimpleApiResponse<RefundResponse>>, (StatusCode, Json<SimpleApiResponse<()>>)> {
    let fingerprint = client_fingerprint(&headers);

    let payment_intent_id = request.payment_intent_id.trim().to_string();
    if payment_intent_id.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(SimpleApiResponse::<()>::error_with_code(
                "VALIDATION_ERROR",
                "payment_intent_id is required",
            )),
        ));
    }

    // Reuse the campaign action validation
    let shaped = CampaignRedeemRequest {
        action: request.action.clone(),
        action_data: request.action_data.clone(),
    };
    let action = match shaped.validate() {
        Ok(action) => action,
        Err(e) => {
            warn!(fingerprint = %fingerprint, "❌ Validation failed: {}", e);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(SimpleApiResponse::<()>::error_with_code("VALIDATION_ERROR", &e)),
            ));
        }
    };

    info!(
        fingerprint = %fingerprint,
        payment_intent_id = %payment_intent_id,
        action = ?action,
        "💸 Refund redemption request"
    );

    // 1. Admission gates before any money moves
    match state.campaign.admit(&fingerprint, CampaignPath::Refund).await {
        Ok(_) => {}
        Err(CampaignError::AlreadyUsed) => {
            return Err((
                StatusCode::CONFLICT,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "ALREADY_USED",
                    "This device already claimed the refund campaign.",
                )),
            ));
        }
        Err(CampaignError::CampaignEnded) => {
            return Err((
                StatusCode::GONE,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "CAMPAIGN_ENDED",
                    "The campaign has reached its limit.",
                )),
            ));
        }
        Err(CampaignError::Store(e)) => {
            error!(fingerprint = %fingerprint, error = %e, "❌ Admission failed on the store");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "INTERNAL_ERROR",
                    "Could not start the refund. Please retry.",
                )),
            ));
        }
    }

    // 2. Provider refund; hand the slot back on rejection
    let refund = match state.stripe.issue_refund(&payment_intent_id).await {
        Ok(refund) => refund,
        Err(e) => {
            state.campaign.release(&fingerprint, CampaignPath::Refund).await;
            return Err(map_refund_error(e));
        }
    };

    // 3. Ledger record, best-effort after the refund went through
    if let Err(e) = state
        .campaign
        .record_action(&fingerprint, action, &request.action_data, Some(&payment_intent_id))
        .await
    {
        error!(fingerprint = %fingerprint, error = %e, "❌ Refund issued but ledger record failed");
    }

    Ok(Json(SimpleApiResponse::success_with_message(
        RefundResponse {
            refund_id: refund.id,
            payment_intent_id,
        },
        "Refund issued. Thanks for spreading the word! 💛".to_string(),
    )))
}

fn map_refund_error(e: PaymentError) -> (StatusCode, Json<SimpleApiResponse<()>>) {
    match e {
        PaymentError::NotCompleted => (
            StatusCode::BAD_REQUEST,
            Json(SimpleApiResponse::<()>::error_with_code(
                "NOT_COMPLETED",
                "That payment never completed, so there is nothing to refund.",
            )),
        ),
        PaymentError::InvalidAmount => (
            StatusCode::BAD_REQUEST,
            Json(SimpleApiResponse::<()>::error_with_code(
                "INVALID_AMOUNT",
                "That payment is not the ¥500 premium charge.",
            )),
        ),
        PaymentError::Configuration(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SimpleApiResponse::<()>::error_with_code(
                "CONFIGURATION_ERROR",
                "Payment is not configured on this deployment.",
            )),
        ),
        other => {
            error!(error = %other, "❌ Refund failed at the provider");
            (
                StatusCode::BAD_GATEWAY,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "PAYMENT_PROVIDER_ERROR",
                    "The payment provider rejected the refund. Please retry.",
                )),
            )
        }
    }
}
