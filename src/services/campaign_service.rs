// ============================================================================
// CAMPAIGN SERVICE
// ============================================================================
// Purpose: Gate the capacity-limited premium promotion and keep a
//          fingerprint from redeeming more than once per path
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::services::coupon_service::{CouponError, CouponService};
use crate::services::redis_service::{RedisKeys, RedisService};

/// Total slots across both redemption paths. Lifetime cap, reset only by
/// administrative action on `campaign:count`.
pub const CAMPAIGN_CAPACITY: i64 = 100;

/// Which qualifying action the user performed for the promotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignAction {
    Share,
    Feedback,
}

impl CampaignAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "share" => Some(Self::Share),
            "feedback" => Some(Self::Feedback),
            _ => None,
        }
    }

    fn record_key(&self, timestamp: i64, fingerprint: &str) -> String {
        match self {
            Self::Share => RedisKeys::share(timestamp, fingerprint),
            Self::Feedback => RedisKeys::feedback(timestamp, fingerprint),
        }
    }
}

/// Free-claim and paid-refund redemptions keep independent usage records
/// but draw on the shared slot counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignPath {
    FreeClaim,
    Refund,
}

impl CampaignPath {
    fn used_key(&self, fingerprint: &str) -> String {
        match self {
            Self::FreeClaim => RedisKeys::campaign_used(fingerprint),
            Self::Refund => RedisKeys::refund_used(fingerprint),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CampaignStatus {
    pub active: bool,
    pub remaining: i64,
    pub user_eligible: bool,
}

/// Marker stored at the per-fingerprint usage key. Presence of the key is
/// the "already used" signal; the payload is bookkeeping.
#[derive(Debug, Serialize, Deserialize)]
struct UsageMarker {
    redeemed_at: DateTime<Utc>,
}

/// Write-once record of the qualifying action
#[derive(Debug, Serialize)]
struct ActionRecord<'a> {
    fingerprint: &'a str,
    action: CampaignAction,
    payload: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_intent_id: Option<&'a str>,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct CampaignService {
    redis: RedisService,
    coupons: CouponService,
}

impl CampaignService {
    pub fn new(redis: RedisService, coupons: CouponService) -> Self {
        Self { redis, coupons }
    }

    /// Read-only ledger snapshot for one fingerprint. Safe to call
    /// unboundedly; mutates nothing.
    pub async fn status(&self, fingerprint: &str) -> Result<CampaignStatus, CampaignError> {
        let count = self
            .redis
            .get_counter(&RedisKeys::campaign_count())
            .await
            .map_err(|e| CampaignError::Store(e.to_string()))?;

        let used = self
            .redis
            .exists(&RedisKeys::campaign_used(fingerprint))
            .await
            .map_err(|e| CampaignError::Store(e.to_string()))?;

        let remaining = (CAMPAIGN_CAPACITY - count).max(0);

        Ok(CampaignStatus {
            active: remaining > 0,
            remaining,
            user_eligible: !used,
        })
    }

    /// Run both admission gates for a path. Each gate is a single atomic
    /// store operation, so concurrent requests can neither double-admit a
    /// fingerprint nor push the counter past capacity.
    pub async fn admit(&self, fingerprint: &str, path: CampaignPath) -> Result<i64, CampaignError> {
        let used_key = path.used_key(fingerprint);
        let marker = UsageMarker { redeemed_at: Utc::now() };

        // Fingerprint gate first: a repeat visitor gets ALREADY_USED even
        // when the campaign is over.
        let won = self
            .redis
            .claim_slot(&used_key, &marker)
            .await
            .map_err(|e| CampaignError::Store(e.to_string()))?;

        if !won {
            warn!(fingerprint = %fingerprint, path = ?path, "🚫 Fingerprint already redeemed");
            return Err(CampaignError::AlreadyUsed);
        }

        // Capacity gate. On rejection the fingerprint gate is handed back
        // so a full campaign does not burn the visitor's one attempt.
        let slot = self
            .redis
            .incr_with_ceiling(&RedisKeys::campaign_count(), CAMPAIGN_CAPACITY)
            .await
            .map_err(|e| CampaignError::Store(e.to_string()))?;

        if slot < 0 {
            let _ = self.redis.delete(&used_key).await;
            warn!(fingerprint = %fingerprint, "🚫 Campaign capacity exhausted");
            return Err(CampaignError::CampaignEnded);
        }

        info!(
            fingerprint = %fingerprint,
            path = ?path,
            slot = slot,
            remaining = CAMPAIGN_CAPACITY - slot,
            "🎟️ Campaign slot admitted"
        );

        Ok(slot)
    }

    /// Hand an admitted slot back, used when a downstream step (the
    /// provider refund) fails after admission.
    pub async fn release(&self, fingerprint: &str, path: CampaignPath) {
        let _ = self.redis.delete(&path.used_key(fingerprint)).await;
        if let Err(e) = self.redis.decr_floor_zero(&RedisKeys::campaign_count()).await {
            error!(fingerprint = %fingerprint, error = %e, "❌ Failed to release campaign slot");
        }
    }

    /// Persist the write-once action record. Best-effort after admission:
    /// a failure here surfaces as a store error while the slot stays
    /// consumed.
    pub async fn record_action(
        &self,
        fingerprint: &str,
        action: CampaignAction,
        action_data: &Value,
        payment_intent_id: Option<&str>,
    ) -> Result<(), CampaignError> {
        let now = Utc::now();
        let record = ActionRecord {
            fingerprint,
            action,
            payload: action_data,
            payment_intent_id,
            created_at: now,
        };

        self.redis
            .set(&action.record_key(now.timestamp(), fingerprint), &record)
            .await
            .map_err(|e| {
                error!(fingerprint = %fingerprint, error = %e, "❌ Failed to persist action record");
                CampaignError::Store(e.to_string())
            })?;

        Ok(())
    }

    /// Full free-claim redemption: admission, action record, coupon.
    pub async fn redeem(
        &self,
        fingerprint: &str,
        action: CampaignAction,
        action_data: &Value,
    ) -> Result<String, CampaignError> {
        self.admit(fingerprint, CampaignPath::FreeClaim).await?;
        self.record_action(fingerprint, action, action_data, None).await?;

        let code = self.coupons.issue(fingerprint).await.map_err(|e| match e {
            CouponError::Store(msg) => CampaignError::Store(msg),
            other => CampaignError::Store(other.to_string()),
        })?;

        info!(
            fingerprint = %fingerprint,
            action = ?action,
            coupon = %code,
            "🎉 Campaign slot redeemed"
        );

        Ok(code)
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("Fingerprint already redeemed this promotion")]
    AlreadyUsed,

    #[error("Campaign capacity exhausted")]
    CampaignEnded,

    #[error("Store error: {0}")]
    Store(String),
}
