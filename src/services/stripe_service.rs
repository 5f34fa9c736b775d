// ============================================================================
// STRIPE SERVICE
// ============================================================================
// Purpose: Thin adapter over the Stripe REST API: PaymentIntent creation,
//          retrieval, refunds and webhook signature verification
// ============================================================================

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use tracing::{error, info, warn};

type HmacSha256 = Hmac<Sha256>;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Premium unlock price. JPY is zero-decimal, so the raw amount is the
/// yen value itself.
pub const PREMIUM_AMOUNT_JPY: i64 = 500;
pub const PREMIUM_CURRENCY: &str = "jpy";

/// Webhook timestamps older than this are rejected
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Clone)]
pub struct StripeService {
    http_client: reqwest::Client,
    api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub status: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Refund {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl StripeService {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            api_base: STRIPE_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (mocked upstream in tests)
    pub fn with_api_base(http_client: reqwest::Client, api_base: String) -> Self {
        Self { http_client, api_base }
    }

    fn secret_key() -> Result<String, PaymentError> {
        let key = std::env::var("STRIPE_SECRET_KEY").unwrap_or_default();
        if key.is_empty() {
            error!("STRIPE_SECRET_KEY not configured");
            return Err(PaymentError::Configuration(
                "Payment provider not configured".to_string(),
            ));
        }
        info!(key_preview = %mask_secret(&key), "💳 Using Stripe secret key");
        Ok(key)
    }

    /// Create a ¥500 PaymentIntent. Prefers automatic payment-method
    /// negotiation; some account configurations reject that mode, in
    /// which case a single retry pins the charge to card only.
    pub async fn create_payment_intent(
        &self,
        email: Option<&str>,
    ) -> Result<PaymentIntent, PaymentError> {
        let key = Self::secret_key()?;

        let mut params: Vec<(String, String)> = vec![
            ("amount".to_string(), PREMIUM_AMOUNT_JPY.to_string()),
            ("currency".to_string(), PREMIUM_CURRENCY.to_string()),
            ("automatic_payment_methods[enabled]".to_string(), "true".to_string()),
        ];
        if let Some(email) = email {
            params.push(("receipt_email".to_string(), email.to_string()));
            params.push(("metadata[email]".to_string(), email.to_string()));
        }

        match self.post_form::<PaymentIntent>("payment_intents", &key, &params).await {
            Ok(intent) => Ok(intent),
            Err(PaymentError::Provider { status: 400, message }) => {
                warn!(
                    error = %message,
                    "⚠️ Automatic payment methods rejected, retrying card-only"
                );
                let mut card_params: Vec<(String, String)> = params
                    .into_iter()
                    .filter(|(k, _)| !k.starts_with("automatic_payment_methods"))
                    .collect();
                card_params.push(("payment_method_types[]".to_string(), "card".to_string()));
                self.post_form::<PaymentIntent>("payment_intents", &key, &card_params)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    /// Retrieve a PaymentIntent by id
    pub async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        let key = Self::secret_key()?;

        let res = self
            .http_client
            .get(format!("{}/payment_intents/{}", self.api_base, id))
            .basic_auth(&key, Option::<&str>::None)
            .send()
            .await
            .map_err(|e| {
                error!(payment_intent_id = %id, error = %e, "Stripe request failed");
                PaymentError::Request(e.to_string())
            })?;

        Self::decode_response(res).await
    }

    /// Issue a full refund for a campaign-qualified payment. Rejects
    /// payments that never completed or were charged a different amount.
    pub async fn issue_refund(&self, payment_intent_id: &str) -> Result<Refund, PaymentError> {
        let intent = self.retrieve_payment_intent(payment_intent_id).await?;

        if intent.status != "succeeded" {
            warn!(
                payment_intent_id = %payment_intent_id,
                status = %intent.status,
                "🚫 Refund refused: payment not completed"
            );
            return Err(PaymentError::NotCompleted);
        }

        if intent.amount != PREMIUM_AMOUNT_JPY || intent.currency != PREMIUM_CURRENCY {
            warn!(
                payment_intent_id = %payment_intent_id,
                amount = intent.amount,
                currency = %intent.currency,
                "🚫 Refund refused: unexpected amount"
            );
            return Err(PaymentError::InvalidAmount);
        }

        let key = Self::secret_key()?;
        let params = vec![
            ("payment_intent".to_string(), payment_intent_id.to_string()),
            ("metadata[campaign]".to_string(), "twinpersona_refund".to_string()),
        ];

        let refund = self.post_form::<Refund>("refunds", &key, &params).await?;

        info!(
            payment_intent_id = %payment_intent_id,
            refund_id = %refund.id,
            "💸 Campaign refund issued"
        );

        Ok(refund)
    }

    async fn post_form<T>(
        &self,
        path: &str,
        key: &str,
        params: &[(String, String)],
    ) -> Result<T, PaymentError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let res = self
            .http_client
            .post(format!("{}/{}", self.api_base, path))
            .basic_auth(key, Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                error!(path = %path, error = %e, "Stripe request failed");
                PaymentError::Request(e.to_string())
            })?;

        Self::decode_response(res).await
    }

    async fn decode_response<T>(res: reqwest::Response) -> Result<T, PaymentError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| "Stripe error".to_string());
            error!(status = %status, error = %message, "Stripe API error");
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        res.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Stripe response");
            PaymentError::Request(e.to_string())
        })
    }
}

/// Verify a Stripe webhook signature header (`t=<ts>,v1=<hex hmac>`)
/// against the raw payload.
pub fn verify_webhook_signature(
    payload: &[u8],
    signature_header: &str,
    webhook_secret: &str,
) -> Result<(), PaymentError> {
    let parts: HashMap<&str, &str> = signature_header
        .split(',')
        .filter_map(|part| {
            let mut split = part.splitn(2, '=');
            Some((split.next()?, split.next()?))
        })
        .collect();

    let timestamp = parts
        .get("t")
        .ok_or_else(|| PaymentError::SignatureInvalid("Missing timestamp".to_string()))?;
    let expected_sig = parts
        .get("v1")
        .ok_or_else(|| PaymentError::SignatureInvalid("Missing signature".to_string()))?;

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| PaymentError::SignatureInvalid("Invalid timestamp".to_string()))?;
    let now = Utc::now().timestamp();
    if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(PaymentError::SignatureInvalid(
            "Webhook timestamp too old".to_string(),
        ));
    }

    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac = HmacSha256::new_from_slice(webhook_secret.as_bytes())
        .map_err(|_| PaymentError::SignatureInvalid("Invalid webhook secret".to_string()))?;
    mac.update(signed_payload.as_bytes());
    let computed_sig = hex::encode(mac.finalize().into_bytes());

    if computed_sig != *expected_sig {
        return Err(PaymentError::SignatureInvalid(
            "Invalid webhook signature".to_string(),
        ));
    }

    Ok(())
}

/// Secrets appear in logs as a short preview only
fn mask_secret(secret: &str) -> String {
    let preview: String = secret.chars().take(7).collect();
    format!("{}...", preview)
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Payment provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Request error: {0}")]
    Request(String),

    #[error("Payment not completed")]
    NotCompleted,

    #[error("Payment amount does not match the premium price")]
    InvalidAmount,

    #[error("Signature verification failed: {0}")]
    SignatureInvalid(String),
}
