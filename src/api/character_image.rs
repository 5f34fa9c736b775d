use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::{
    api::common::SimpleApiResponse,
    services::image_service::{Gender, ImageOutcome, ImageScores, Occupation},
    state::AppState,
};

// ============================================================================
// REQUEST/RESPONSE MODELS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CharacterImageRequest {
    pub mbti_type: String,
    pub character_code: String,
    pub scores: ImageScores,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CharacterImageResponse {
    /// False means the placeholder is being served
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Placeholder graphic as a data URI when generation was unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_url: Option<String>,
    /// "dalle" or "placeholder"
    pub source: &'static str,
}

// ============================================================================
// HANDLER
// ============================================================================

/// POST /api/v1/ai/character-image
///
/// Premium character artwork. Always 200: a dead provider serves the
/// deterministic placeholder graphic with success=false.
pub async fn handle_character_image(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CharacterImageRequest>,
) -> Json<SimpleApiResponse<CharacterImageResponse>> {
    let gender = Gender::parse(request.gender.as_deref().unwrap_or(""));
    let occupation = Occupation::parse(request.occupation.as_deref());

    let outcome = state
        .images
        .generate(
            &request.mbti_type,
            &request.character_code,
            request.scores,
            gender,
            occupation,
        )
        .await;

    info!(
        character_code = %request.character_code,
        source = outcome.source(),
        "🖼️ Character image request served"
    );

    let source = outcome.source();
    let response = match outcome {
        ImageOutcome::Generated { image_url } => CharacterImageResponse {
            success: true,
            image_url: Some(image_url),
            alternative_url: None,
            source,
        },
        ImageOutcome::Placeholder { data_uri } => CharacterImageResponse {
            success: false,
            image_url: None,
            alternative_url: Some(data_uri),
            source,
        },
    };

    Json(SimpleApiResponse::success(response))
}
