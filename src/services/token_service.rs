// ============================================================================
// TOKEN SERVICE
// ============================================================================
// Purpose: Premium access tokens minted after a confirmed payment.
//          Stored in Redis so any instance can verify a token minted by
//          the webhook on another instance.
// ============================================================================

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::services::redis_service::{RedisKeys, RedisService};

/// Access tokens outlive a checkout session but not a day
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct TokenService {
    redis: RedisService,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenData {
    pub payment_intent_id: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
}

impl TokenService {
    pub fn new(redis: RedisService) -> Self {
        Self { redis }
    }

    /// Mint an access token for a confirmed payment
    pub async fn mint(
        &self,
        payment_intent_id: &str,
        email: Option<&str>,
    ) -> Result<String, TokenServiceError> {
        let token = Uuid::new_v4().to_string();
        let key = RedisKeys::access_token(&token);

        let data = AccessTokenData {
            payment_intent_id: payment_intent_id.to_string(),
            email: email.map(|e| e.to_string()),
            created_at: Utc::now(),
            expires_at: Utc::now() + ChronoDuration::hours(ACCESS_TOKEN_TTL_HOURS),
            used: false,
            used_at: None,
        };

        self.redis
            .set_with_ttl(&key, &data, (ACCESS_TOKEN_TTL_HOURS * 3600) as u64)
            .await
            .map_err(|e| {
                error!(
                    payment_intent_id = %payment_intent_id,
                    error = %e,
                    "❌ Failed to store access token in Redis"
                );
                TokenServiceError::Store(e.to_string())
            })?;

        info!(
            payment_intent_id = %payment_intent_id,
            token_prefix = %&token[0..8],
            ttl_hours = ACCESS_TOKEN_TTL_HOURS,
            "🔑 Access token minted"
        );

        Ok(token)
    }

    /// Verify an access token. The token keeps authorizing premium calls
    /// for its whole lifetime; the first verification stamps `used` for
    /// bookkeeping but does not reject later ones.
    pub async fn verify(&self, token: &str) -> Result<AccessTokenData, TokenServiceError> {
        let key = RedisKeys::access_token(token);

        let data: AccessTokenData = self
            .redis
            .get(&key)
            .await
            .map_err(|e| TokenServiceError::Store(e.to_string()))?
            .ok_or_else(|| {
                warn!(
                    token_prefix = %&token[0..8.min(token.len())],
                    "🚫 Access token not found or expired"
                );
                TokenServiceError::NotFound
            })?;

        // Backstop behind the store TTL
        if data.expires_at < Utc::now() {
            let _ = self.redis.delete(&key).await;
            warn!(
                token_prefix = %&token[0..8.min(token.len())],
                expired_at = %data.expires_at,
                "🚫 Access token past its window"
            );
            return Err(TokenServiceError::Expired);
        }

        if !data.used {
            let _ = self.redis.burn_once(&key, &Utc::now().to_rfc3339()).await;
        }

        info!(
            token_prefix = %&token[0..8.min(token.len())],
            payment_intent_id = %data.payment_intent_id,
            "✅ Access token verified"
        );

        Ok(data)
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TokenServiceError {
    #[error("Access token not found or expired")]
    NotFound,

    #[error("Access token has expired")]
    Expired,

    #[error("Store error: {0}")]
    Store(String),
}
