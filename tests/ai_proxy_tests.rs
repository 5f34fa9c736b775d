// ============================================================================
// AI PROXY TESTS - advice and artwork proxies against a mocked upstream
// ============================================================================
// wiremock stands in for the chat-completion, image and payment APIs, so
// these run in the default `cargo test` pass with no network access.

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use twinpersona_ws::services::advice_service::{default_bundle, AdviceOutcome, AdviceService};
use twinpersona_ws::services::image_service::{
    Gender, ImageOutcome, ImageScores, ImageService, Occupation,
};
use twinpersona_ws::services::stripe_service::{PaymentError, StripeService};

const SCORES: ImageScores = ImageScores {
    charisma: 60,
    empathy: 55,
    mystery: 40,
    energy: 70,
};

fn set_test_keys() {
    std::env::set_var("OPENAI_API_KEY", "test-key");
    std::env::set_var("STRIPE_SECRET_KEY", "sk_test_key");
}

fn chat_reply(content: &str) -> serde_json::Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

// ============================================================================
// ADVICE PROXY
// ============================================================================

#[tokio::test]
async fn test_advice_parses_structured_reply() {
    set_test_keys();
    let server = MockServer::start().await;

    let content = json!({
        "career": ["Own the room."],
        "relationships": ["Call your friends."],
        "romance": ["Be early."],
        "growth": ["Read more."],
        "lifestyle": ["Walk daily."],
        "stress": ["Breathe."]
    })
    .to_string();

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            chat_reply(&content).to_string(),
            mime::APPLICATION_JSON.as_ref(),
        ))
        .mount(&server)
        .await;

    let service = AdviceService::with_api_base(reqwest::Client::new(), server.uri());
    let outcome = service.generate("ENFP", "WOPD", 2).await;

    match outcome {
        AdviceOutcome::Generated(bundle) => {
            assert_eq!(bundle.career, vec!["Own the room."]);
            assert_eq!(bundle.stress, vec!["Breathe."]);
        }
        AdviceOutcome::Fallback(_) => panic!("structured reply should not degrade"),
    }
}

#[tokio::test]
async fn test_advice_line_splits_plain_text_reply() {
    set_test_keys();
    let server = MockServer::start().await;

    let twenty_lines: String = (1..=20).map(|i| format!("tip {}\n", i)).collect();

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(&twenty_lines)))
        .mount(&server)
        .await;

    let service = AdviceService::with_api_base(reqwest::Client::new(), server.uri());
    let outcome = service.generate("INTJ", "CRMS", 4).await;

    match outcome {
        AdviceOutcome::Fallback(bundle) => {
            // Fixed ranges: lines 0-2 career, 3-5 relationships, and so on
            assert_eq!(bundle.career, vec!["tip 1", "tip 2", "tip 3"]);
            assert_eq!(bundle.relationships, vec!["tip 4", "tip 5", "tip 6"]);
            assert_eq!(bundle.romance, vec!["tip 7", "tip 8", "tip 9"]);
            assert_eq!(bundle.growth, vec!["tip 10", "tip 11", "tip 12"]);
            assert_eq!(bundle.lifestyle, vec!["tip 13", "tip 14", "tip 15"]);
            assert_eq!(bundle.stress, vec!["tip 16", "tip 17", "tip 18"]);
        }
        AdviceOutcome::Generated(_) => panic!("plain text must go through the fallback"),
    }
}

#[tokio::test]
async fn test_advice_upstream_error_serves_static_bundle() {
    set_test_keys();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = AdviceService::with_api_base(reqwest::Client::new(), server.uri());
    let outcome = service.generate("ISFJ", "WRMS", 1).await;

    match outcome {
        AdviceOutcome::Fallback(bundle) => {
            assert_eq!(bundle.career, default_bundle().career);
        }
        AdviceOutcome::Generated(_) => panic!("a dead upstream must degrade"),
    }
}

// ============================================================================
// IMAGE PROXY
// ============================================================================

#[tokio::test]
async fn test_image_returns_provider_url() {
    set_test_keys();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"url": "https://img.example/char.png"}]
        })))
        .mount(&server)
        .await;

    let service = ImageService::with_api_base(reqwest::Client::new(), server.uri());
    let outcome = service
        .generate("ENFP", "WOPD", SCORES, Gender::Female, Occupation::Creative)
        .await;

    match outcome {
        ImageOutcome::Generated { image_url } => {
            assert_eq!(image_url, "https://img.example/char.png");
        }
        ImageOutcome::Placeholder { .. } => panic!("provider url should be passed through"),
    }
}

#[tokio::test]
async fn test_image_provider_error_serves_placeholder() {
    set_test_keys();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let service = ImageService::with_api_base(reqwest::Client::new(), server.uri());
    let outcome = service
        .generate("INTP", "CRPS", SCORES, Gender::Neutral, Occupation::Unspecified)
        .await;

    match outcome {
        ImageOutcome::Placeholder { data_uri } => {
            assert!(data_uri.starts_with("data:image/svg+xml;base64,"));
        }
        ImageOutcome::Generated { .. } => panic!("a dead provider must degrade"),
    }
}

#[tokio::test]
async fn test_image_empty_result_serves_placeholder() {
    set_test_keys();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let service = ImageService::with_api_base(reqwest::Client::new(), server.uri());
    let outcome = service
        .generate("ESTP", "COPD", SCORES, Gender::Male, Occupation::Service)
        .await;

    assert!(matches!(outcome, ImageOutcome::Placeholder { .. }));
}

// ============================================================================
// STRIPE ADAPTER
// ============================================================================

fn intent_body(id: &str, status: &str, amount: i64) -> serde_json::Value {
    json!({
        "id": id,
        "client_secret": format!("{}_secret", id),
        "status": status,
        "amount": amount,
        "currency": "jpy"
    })
}

#[tokio::test]
async fn test_create_intent_prefers_automatic_methods() {
    set_test_keys();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/payment_intents"))
        .and(body_string_contains("automatic_payment_methods"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(intent_body("pi_auto", "requires_payment_method", 500)),
        )
        .mount(&server)
        .await;

    let service = StripeService::with_api_base(reqwest::Client::new(), server.uri());
    let intent = service
        .create_payment_intent(Some("quiz@example.com"))
        .await
        .unwrap();

    assert_eq!(intent.id, "pi_auto");
    assert_eq!(intent.amount, 500);
}

#[tokio::test]
async fn test_create_intent_falls_back_to_card_only() {
    set_test_keys();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/payment_intents"))
        .and(body_string_contains("automatic_payment_methods"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "automatic_payment_methods is not supported"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/payment_intents"))
        .and(body_string_contains("payment_method_types"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(intent_body("pi_card", "requires_payment_method", 500)),
        )
        .mount(&server)
        .await;

    let service = StripeService::with_api_base(reqwest::Client::new(), server.uri());
    let intent = service.create_payment_intent(None).await.unwrap();

    assert_eq!(intent.id, "pi_card");
}

#[tokio::test]
async fn test_refund_rejects_incomplete_payment() {
    set_test_keys();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/payment_intents/pi_pending"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(intent_body("pi_pending", "requires_payment_method", 500)),
        )
        .mount(&server)
        .await;

    let service = StripeService::with_api_base(reqwest::Client::new(), server.uri());
    let result = service.issue_refund("pi_pending").await;

    assert!(matches!(result, Err(PaymentError::NotCompleted)));
}

#[tokio::test]
async fn test_refund_rejects_wrong_amount() {
    set_test_keys();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/payment_intents/pi_big"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(intent_body("pi_big", "succeeded", 5000)),
        )
        .mount(&server)
        .await;

    let service = StripeService::with_api_base(reqwest::Client::new(), server.uri());
    let result = service.issue_refund("pi_big").await;

    assert!(matches!(result, Err(PaymentError::InvalidAmount)));
}

#[tokio::test]
async fn test_refund_succeeds_for_exact_premium_charge() {
    set_test_keys();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/payment_intents/pi_ok"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(intent_body("pi_ok", "succeeded", 500)),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/refunds"))
        .and(body_string_contains("pi_ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "re_1",
            "status": "succeeded"
        })))
        .mount(&server)
        .await;

    let service = StripeService::with_api_base(reqwest::Client::new(), server.uri());
    let refund = service.issue_refund("pi_ok").await.unwrap();

    assert_eq!(refund.id, "re_1");
}
