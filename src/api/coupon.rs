use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    api::common::SimpleApiResponse,
    services::coupon_service::CouponError,
    state::AppState,
};

// ============================================================================
// REQUEST/RESPONSE MODELS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CouponValidateRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct CouponValidateResponse {
    pub code: String,
    pub used_at: DateTime<Utc>,
}

// ============================================================================
// HANDLER
// ============================================================================

/// POST /api/v1/coupon/validate
///
/// Checks and burns a premium coupon. Each code validates successfully at
/// most once; a second call comes back ALREADY_USED.
pub async fn handle_validate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CouponValidateRequest>,
) -> Result<Json<SimpleApiResponse<CouponValidateResponse>>, (StatusCode, Json<SimpleApiResponse<()>>)> {
    let code = request.code.trim().to_uppercase();

    if code.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(SimpleApiResponse::<()>::error_with_code(
                "VALIDATION_ERROR",
                "Coupon code is required",
            )),
        ));
    }

    match state.coupons.validate(&code).await {
        Ok(record) => {
            info!(code = %code, "✅ Coupon accepted");
            Ok(Json(SimpleApiResponse::success(CouponValidateResponse {
                code,
                used_at: record.used_at.unwrap_or_else(Utc::now),
            })))
        }
        Err(CouponError::NotFound) => {
            warn!(code = %code, "🚫 Unknown coupon");
            Err((
                StatusCode::NOT_FOUND,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "NOT_FOUND",
                    "This coupon does not exist or has expired.",
                )),
            ))
        }
        Err(CouponError::AlreadyUsed) => Err((
            StatusCode::CONFLICT,
            Json(SimpleApiResponse::<()>::error_with_code(
                "ALREADY_USED",
                "This coupon was already used.",
            )),
        )),
        Err(CouponError::Expired) => Err((
            StatusCode::GONE,
            Json(SimpleApiResponse::<()>::error_with_code(
                "EXPIRED",
                "This coupon expired 24 hours after it was issued.",
            )),
        )),
        Err(CouponError::Store(e)) => {
            error!(code = %code, error = %e, "❌ Coupon validation failed on the store");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "INTERNAL_ERROR",
                    "Could not validate the coupon. Please retry.",
                )),
            ))
        }
    }
}
