use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::{
    api::common::{ApiError, SimpleApiResponse},
    services::advice_service::AdviceBundle,
    state::AppState,
};

// ============================================================================
// REQUEST/RESPONSE MODELS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AdviceRequest {
    pub mbti_type: String,
    pub character_code: String,
    pub gap_level: u8,
}

#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    pub advice: AdviceBundle,
    /// "ai" when the model reply parsed, "fallback" otherwise
    pub source: &'static str,
}

impl AdviceRequest {
    fn validate(&self) -> Result<(), String> {
        if self.mbti_type.len() != 4 || !self.mbti_type.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(format!("Invalid mbti_type: {}", self.mbti_type));
        }
        if self.character_code.len() != 4
            || !self.character_code.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(format!("Invalid character_code: {}", self.character_code));
        }
        if !(1..=5).contains(&self.gap_level) {
            return Err(format!("Invalid gap_level: {}. Must be 1 to 5", self.gap_level));
        }
        Ok(())
    }
}

// ============================================================================
// HANDLER
// ============================================================================

/// POST /api/v1/ai/advice
///
/// Premium advice text in six fixed categories. Always 200 with a full
/// bundle; a degraded upstream shows up only in the `source` field.
pub async fn handle_advice(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdviceRequest>,
) -> Result<Json<SimpleApiResponse<AdviceResponse>>, ApiError> {
    request.validate().map_err(|e| ApiError::validation(&e))?;

    let outcome = state
        .advice
        .generate(&request.mbti_type, &request.character_code, request.gap_level)
        .await;

    info!(
        mbti = %request.mbti_type,
        character_code = %request.character_code,
        source = outcome.source(),
        "📝 Advice request served"
    );

    Ok(Json(SimpleApiResponse::success(AdviceResponse {
        source: outcome.source(),
        advice: outcome.bundle().clone(),
    })))
}
