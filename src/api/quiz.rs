use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::{
    api::common::{ApiError, SimpleApiResponse},
    scoring::{CharacterAnswer, MbtiAnswer, QuizResult},
    state::AppState,
};

// ============================================================================
// REQUEST MODELS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct QuizScoreRequest {
    pub mbti_answers: Vec<MbtiAnswer>,
    pub character_answers: Vec<CharacterAnswer>,
}

// ============================================================================
// HANDLER
// ============================================================================

/// POST /api/v1/quiz/score
///
/// Canonical server-side scoring. The SPA scores locally with the same
/// tables; native clients call this instead of bundling them.
pub async fn handle_score(
    State(_state): State<Arc<AppState>>,
    Json(request): Json<QuizScoreRequest>,
) -> Result<Json<SimpleApiResponse<QuizResult>>, ApiError> {
    if request.mbti_answers.is_empty() || request.character_answers.is_empty() {
        return Err(ApiError::validation("Both answer lists are required"));
    }

    let result = QuizResult::build(&request.mbti_answers, &request.character_answers);

    info!(
        mbti = %result.mbti_code,
        character_code = %result.character_code,
        gap_level = result.gap_level,
        "🎭 Quiz scored"
    );

    Ok(Json(SimpleApiResponse::success(result)))
}
