use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    api::common::SimpleApiResponse,
    services::stripe_service::verify_webhook_signature,
    state::AppState,
};

// ============================================================================
// STRIPE EVENT SHAPE (only the fields this service reads)
// ============================================================================

#[derive(Debug, Deserialize)]
struct StripeEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Value,
}

// ============================================================================
// HANDLER
// ============================================================================

/// POST /api/v1/payment/webhook
///
/// Stripe event sink. Signature verification runs whenever
/// STRIPE_WEBHOOK_SECRET is configured; an unsigned development
/// deployment skips it with a warning. Unrecognized event types are
/// acknowledged, not errors.
pub async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default();

    if webhook_secret.is_empty() {
        warn!("STRIPE_WEBHOOK_SECRET not set, accepting unsigned webhook (development mode)");
    } else {
        let signature = headers
            .get("stripe-signature")
            .and_then(|sig| sig.to_str().ok())
            .unwrap_or("");

        if signature.is_empty() {
            warn!("🚫 Webhook without Stripe-Signature header");
            return (
                StatusCode::BAD_REQUEST,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "SIGNATURE_INVALID",
                    "Missing signature",
                )),
            )
                .into_response();
        }

        if let Err(e) = verify_webhook_signature(body.as_bytes(), signature, &webhook_secret) {
            warn!(error = %e, "🚫 Webhook signature verification failed");
            return (
                StatusCode::UNAUTHORIZED,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "SIGNATURE_INVALID",
                    "Invalid signature",
                )),
            )
                .into_response();
        }
    }

    let event: StripeEvent = match serde_json::from_str(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "🚫 Webhook payload was not a Stripe event");
            return (
                StatusCode::BAD_REQUEST,
                Json(SimpleApiResponse::<()>::error_with_code(
                    "VALIDATION_ERROR",
                    "Invalid event payload",
                )),
            )
                .into_response();
        }
    };

    info!(event_type = %event.event_type, "📬 Stripe event received");

    match event.event_type.as_str() {
        "payment_intent.succeeded" => {
            let intent_id = event
                .data
                .object
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();

            if intent_id.is_empty() {
                warn!("🚫 payment_intent.succeeded without an intent id");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(SimpleApiResponse::<()>::error_with_code(
                        "VALIDATION_ERROR",
                        "Event object has no id",
                    )),
                )
                    .into_response();
            }

            let email = event
                .data
                .object
                .get("receipt_email")
                .and_then(|v| v.as_str())
                .or_else(|| {
                    event
                        .data
                        .object
                        .pointer("/metadata/email")
                        .and_then(|v| v.as_str())
                });

            match state.tokens.mint(&intent_id, email).await {
                Ok(_token) => {
                    info!(payment_intent_id = %intent_id, "🔓 Premium unlocked for payment");
                }
                Err(e) => {
                    error!(payment_intent_id = %intent_id, error = %e, "❌ Failed to mint access token");
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(SimpleApiResponse::<()>::error_with_code(
                            "INTERNAL_ERROR",
                            "Failed to record the payment",
                        )),
                    )
                        .into_response();
                }
            }
        }
        "payment_intent.payment_failed" => {
            let intent_id = event
                .data
                .object
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            // Log only; the client retries through a fresh intent
            warn!(payment_intent_id = %intent_id, "💔 Payment failed");
        }
        other => {
            info!(event_type = %other, "ℹ️ Ignoring unhandled event type");
        }
    }

    (
        StatusCode::OK,
        Json(SimpleApiResponse::success(serde_json::json!({"received": true}))),
    )
        .into_response()
}
