// ============================================================================
// COUPON SERVICE
// ============================================================================
// Purpose: Mint and validate the single-use premium coupons handed out by
//          the campaign
// ============================================================================

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::services::redis_service::{RedisKeys, RedisService};

/// Coupon lifetime, also enforced at the store level via TTL
pub const COUPON_TTL_HOURS: i64 = 24;

const CODE_LENGTH: usize = 8;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Clone)]
pub struct CouponService {
    redis: RedisService,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponRecord {
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
}

impl CouponService {
    pub fn new(redis: RedisService) -> Self {
        Self { redis }
    }

    /// Mint a coupon for a fingerprint and store it with a 24h expiry.
    /// Codes come from a non-cryptographic source on purpose: they gate a
    /// promotional unlock, not an account.
    pub async fn issue(&self, fingerprint: &str) -> Result<String, CouponError> {
        let code = generate_code();
        let key = RedisKeys::coupon(&code);

        let record = CouponRecord {
            fingerprint: fingerprint.to_string(),
            created_at: Utc::now(),
            used: false,
            used_at: None,
        };

        self.redis
            .set_with_ttl(&key, &record, (COUPON_TTL_HOURS * 3600) as u64)
            .await
            .map_err(|e| {
                error!(code = %code, error = %e, "❌ Failed to store coupon in Redis");
                CouponError::Store(e.to_string())
            })?;

        info!(
            code = %code,
            fingerprint = %fingerprint,
            ttl_hours = COUPON_TTL_HOURS,
            "🎫 Coupon issued"
        );

        Ok(code)
    }

    /// Validate a coupon and burn it. Succeeds at most once per code: the
    /// unused -> used transition runs as a single atomic script on the
    /// store, so two concurrent validations cannot both pass.
    pub async fn validate(&self, code: &str) -> Result<CouponRecord, CouponError> {
        let key = RedisKeys::coupon(code);

        let record: CouponRecord = self
            .redis
            .get(&key)
            .await
            .map_err(|e| CouponError::Store(e.to_string()))?
            .ok_or_else(|| {
                warn!(code = %code, "🚫 Coupon not found or evicted");
                CouponError::NotFound
            })?;

        // The store TTL should have evicted an old coupon already; this is
        // the application-level backstop.
        let now = Utc::now();
        if now > record.created_at + ChronoDuration::hours(COUPON_TTL_HOURS) {
            warn!(code = %code, created_at = %record.created_at, "🚫 Coupon past its 24h window");
            return Err(CouponError::Expired);
        }

        match self
            .redis
            .burn_once(&key, &now.to_rfc3339())
            .await
            .map_err(|e| CouponError::Store(e.to_string()))?
        {
            1 => {
                info!(code = %code, fingerprint = %record.fingerprint, "✅ Coupon validated and burned");
                Ok(CouponRecord {
                    used: true,
                    used_at: Some(now),
                    ..record
                })
            }
            0 => {
                warn!(code = %code, "🚫 Coupon already used");
                Err(CouponError::AlreadyUsed)
            }
            _ => Err(CouponError::NotFound),
        }
    }
}

/// 8-character uppercase alphanumeric code
fn generate_code() -> String {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CouponError {
    #[error("Coupon not found")]
    NotFound,

    #[error("Coupon already used")]
    AlreadyUsed,

    #[error("Coupon has expired")]
    Expired,

    #[error("Store error: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_codes_vary() {
        let first = generate_code();
        let distinct = (0..20).any(|_| generate_code() != first);
        assert!(distinct, "100 identical codes would mean a broken RNG");
    }

    #[test]
    fn test_coupon_record_roundtrip() {
        let record = CouponRecord {
            fingerprint: "dW5rbm93bnx1bmtu".to_string(),
            created_at: Utc::now(),
            used: false,
            used_at: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("used_at"));

        let back: CouponRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.fingerprint, record.fingerprint);
        assert!(!back.used);
    }
}
