use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    api::common::SimpleApiResponse,
    services::token_service::TokenServiceError,
    state::AppState,
};

// ============================================================================
// REQUEST/RESPONSE MODELS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub premium: bool,
    pub payment_intent_id: String,
    pub expires_at: DateTime<Utc>,
}

// ============================================================================
// HANDLER
// ============================================================================

/// POST /api/v1/payment/verify-token
///
/// Authorizes premium-feature calls with the access token minted by the
/// payment webhook. Valid for 24 hours after the payment; usable more
/// than once within that window.
pub async fn handle_verify_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyTokenRequest>,
) -> Result<Json<SimpleApiResponse<VerifyTokenResponse>>, (StatusCode, Json<SimpleApiResponse<()>>)> {
    let token = request.token.trim();

    if token.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(SimpleApiResponse::<()>::error_with_code(
                "VALIDATION_ERROR",
                "token is required",
            )),
        ));
    }

    match state.tokens.verify(token).await {
        Ok(data) => {
            info!(payment_intent_id = %data.payment_intent_id, "🔓 Premium access verified");
            Ok(Json(SimpleApiResponse::success(VerifyTokenResponse {
                premium: true,
                payment_intent_id: data.payment_intent_id,
                expires_at: data.expires_at,
            })))
        }
        Err(TokenServiceError::NotFound) => Err((
            StatusCode::NOT_FOUND,
            Json(SimpleApiResponse::<()>::error_with_code(
                "NOT_FOUND",
                "Unknown or expired access token.",
            )),
        )),
        Err(TokenServiceError::Expired) => Err((
            StatusCode::GONE,
            Json(SimpleApiResponse::<()>::error_with_code(
                "EXPIRED",
                "This access token expired 24 hours after the payment.",
            )),
        )),
        Err(TokenServiceError::Store(e)) => {
            error!(error = %e, "❌ Token verification failed on the store");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "INTERNAL_ERROR",
                    "Could not verify the token. Please retry.",
                )),
            ))
        }
    }
}
