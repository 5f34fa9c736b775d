use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    api::common::SimpleApiResponse,
    services::stripe_service::{PaymentError, PREMIUM_AMOUNT_JPY},
    state::AppState,
};

// ============================================================================
// REQUEST/RESPONSE MODELS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    /// Receipt address, also kept as metadata for webhook correlation
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
    pub amount: i64,
}

// ============================================================================
// HANDLER
// ============================================================================

/// POST /api/v1/payment/create-intent
///
/// Creates the fixed ¥500 premium charge intent.
pub async fn handle_create_intent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<SimpleApiResponse<CreateIntentResponse>>, (StatusCode, Json<SimpleApiResponse<()>>)> {
    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let intent = state
        .stripe
        .create_payment_intent(email)
        .await
        .map_err(|e| match e {
            PaymentError::Configuration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "CONFIGURATION_ERROR",
                    "Payment is not configured on this deployment.",
                )),
            ),
            other => {
                error!(error = %other, "❌ PaymentIntent creation failed");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(SimpleApiResponse::<()>::error_with_code(
                        "PAYMENT_PROVIDER_ERROR",
                        "The payment provider rejected the request. Please retry.",
                    )),
                )
            }
        })?;

    let client_secret = intent.client_secret.ok_or_else(|| {
        error!(payment_intent_id = %intent.id, "❌ PaymentIntent came back without a client secret");
        (
            StatusCode::BAD_GATEWAY,
            Json(SimpleApiResponse::<()>::error_with_code(
                "PAYMENT_PROVIDER_ERROR",
                "The payment provider returned an incomplete intent.",
            )),
        )
    })?;

    info!(payment_intent_id = %intent.id, "💳 PaymentIntent created");

    Ok(Json(SimpleApiResponse::success(CreateIntentResponse {
        client_secret,
        payment_intent_id: intent.id,
        amount: PREMIUM_AMOUNT_JPY,
    })))
}
