pub mod advice;
pub mod campaign; // Capacity-limited promotion
pub mod character_image;
pub mod common;
pub mod coupon;
pub mod payment; // Stripe adapter endpoints
pub mod quiz;
pub mod root;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

fn create_campaign_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/campaign/status", get(campaign::handle_status))
        .route("/api/v1/campaign/redeem", post(campaign::handle_redeem))
        .route("/api/v1/coupon/validate", post(coupon::handle_validate))
}

fn create_payment_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/payment/create-intent", post(payment::handle_create_intent))
        .route("/api/v1/payment/webhook", post(payment::handle_webhook))
        .route("/api/v1/payment/refund", post(payment::handle_refund))
        .route("/api/v1/payment/verify-token", post(payment::handle_verify_token))
}

fn create_ai_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/ai/advice", post(advice::handle_advice))
        .route("/api/v1/ai/character-image", post(character_image::handle_character_image))
}

/// Creates the API router with all REST endpoints
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root::handle_root))
        .route("/health", get(root::handle_health))
        .route("/api/v1/quiz/score", post(quiz::handle_score))
        .merge(create_campaign_router())
        .merge(create_payment_router())
        .merge(create_ai_router())
}

/// Permissive CORS: the quiz runs as a static SPA on a different origin,
/// and every endpoint here is either public or self-authorizing.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
