// ============================================================================
// CAMPAIGN FLOW TESTS - ledger, coupons and access tokens against Redis
// ============================================================================
// These tests need a running Redis instance (REDIS_URL, defaults to
// localhost). They are #[ignore]d so the default `cargo test` run stays
// store-free; run them with `cargo test -- --ignored`.

use chrono::{Duration as ChronoDuration, Utc};
use deadpool_redis::redis::AsyncCommands;
use uuid::Uuid;

use twinpersona_ws::services::campaign_service::{
    CampaignAction, CampaignError, CampaignPath, CampaignService, CAMPAIGN_CAPACITY,
};
use twinpersona_ws::services::coupon_service::{CouponError, CouponRecord, CouponService};
use twinpersona_ws::services::redis_service::{RedisKeys, RedisService};
use twinpersona_ws::services::token_service::{TokenService, TokenServiceError};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn test_pool() -> deadpool_redis::Pool {
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    deadpool_redis::Config::from_url(redis_url)
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("Failed to create test Redis pool")
}

fn services() -> (deadpool_redis::Pool, CampaignService, CouponService, TokenService) {
    let pool = test_pool();
    let redis = RedisService::new(pool.clone());
    let coupons = CouponService::new(redis.clone());
    let campaign = CampaignService::new(redis.clone(), coupons.clone());
    let tokens = TokenService::new(redis);
    (pool, campaign, coupons, tokens)
}

fn fresh_fingerprint() -> String {
    Uuid::new_v4().simple().to_string()[..16].to_string()
}

async fn reset_counter(pool: &deadpool_redis::Pool, value: i64) {
    let mut conn = pool.get().await.expect("Redis connection");
    if value == 0 {
        let _: () = conn.del(RedisKeys::campaign_count()).await.unwrap();
    } else {
        let _: () = conn.set(RedisKeys::campaign_count(), value).await.unwrap();
    }
}

async fn cleanup_fingerprint(pool: &deadpool_redis::Pool, fingerprint: &str) {
    let mut conn = pool.get().await.expect("Redis connection");
    let _: () = conn.del(RedisKeys::campaign_used(fingerprint)).await.unwrap();
    let _: () = conn.del(RedisKeys::refund_used(fingerprint)).await.unwrap();
}

// ============================================================================
// CAMPAIGN LEDGER
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_redeem_consumes_one_slot() {
    let (pool, campaign, _, _) = services();
    reset_counter(&pool, 0).await;

    let fp = fresh_fingerprint();
    let code = campaign
        .redeem(&fp, CampaignAction::Share, &serde_json::json!({"platform": "x"}))
        .await
        .expect("first redemption should succeed");

    assert_eq!(code.len(), 8);

    let status = campaign.status(&fp).await.unwrap();
    assert_eq!(status.remaining, CAMPAIGN_CAPACITY - 1);
    assert!(!status.user_eligible);

    cleanup_fingerprint(&pool, &fp).await;
    reset_counter(&pool, 0).await;
}

#[tokio::test]
#[ignore]
async fn test_second_redeem_rejected_regardless_of_action() {
    let (pool, campaign, _, _) = services();
    reset_counter(&pool, 0).await;

    let fp = fresh_fingerprint();
    campaign
        .redeem(&fp, CampaignAction::Share, &serde_json::json!({"platform": "x"}))
        .await
        .unwrap();

    // Retrying with the other action must not help
    let retry = campaign
        .redeem(&fp, CampaignAction::Feedback, &serde_json::json!({"rating": 5}))
        .await;
    assert!(matches!(retry, Err(CampaignError::AlreadyUsed)));

    cleanup_fingerprint(&pool, &fp).await;
    reset_counter(&pool, 0).await;
}

#[tokio::test]
#[ignore]
async fn test_last_slot_flips_campaign_inactive() {
    let (pool, campaign, _, _) = services();
    // counter = 99: exactly one slot left
    reset_counter(&pool, CAMPAIGN_CAPACITY - 1).await;

    let fp = fresh_fingerprint();
    campaign
        .redeem(&fp, CampaignAction::Share, &serde_json::json!({"platform": "x"}))
        .await
        .expect("the 100th redemption should still succeed");

    let status = campaign.status("someone-else____").await.unwrap();
    assert_eq!(status.remaining, 0);
    assert!(!status.active);

    // The 101st visitor is out of luck
    let late_fp = fresh_fingerprint();
    let late = campaign
        .redeem(&late_fp, CampaignAction::Share, &serde_json::json!({"platform": "x"}))
        .await;
    assert!(matches!(late, Err(CampaignError::CampaignEnded)));

    // A capacity rejection must not burn the late visitor's eligibility
    let late_status = campaign.status(&late_fp).await.unwrap();
    assert!(late_status.user_eligible);

    cleanup_fingerprint(&pool, &fp).await;
    cleanup_fingerprint(&pool, &late_fp).await;
    reset_counter(&pool, 0).await;
}

#[tokio::test]
#[ignore]
async fn test_counter_never_exceeds_capacity() {
    let (pool, campaign, _, _) = services();
    reset_counter(&pool, 0).await;

    let mut fingerprints = Vec::new();
    for _ in 0..CAMPAIGN_CAPACITY {
        let fp = fresh_fingerprint();
        campaign
            .redeem(&fp, CampaignAction::Share, &serde_json::json!({"platform": "x"}))
            .await
            .expect("redemptions within capacity should succeed");
        fingerprints.push(fp);
    }

    let overflow_fp = fresh_fingerprint();
    let overflow = campaign
        .redeem(&overflow_fp, CampaignAction::Share, &serde_json::json!({"platform": "x"}))
        .await;
    assert!(matches!(overflow, Err(CampaignError::CampaignEnded)));

    let mut conn = pool.get().await.unwrap();
    let count: i64 = conn.get(RedisKeys::campaign_count()).await.unwrap();
    assert_eq!(count, CAMPAIGN_CAPACITY);

    for fp in &fingerprints {
        cleanup_fingerprint(&pool, fp).await;
    }
    cleanup_fingerprint(&pool, &overflow_fp).await;
    reset_counter(&pool, 0).await;
}

#[tokio::test]
#[ignore]
async fn test_refund_path_is_independent_of_free_path() {
    let (pool, campaign, _, _) = services();
    reset_counter(&pool, 0).await;

    let fp = fresh_fingerprint();
    campaign
        .redeem(&fp, CampaignAction::Share, &serde_json::json!({"platform": "x"}))
        .await
        .unwrap();

    // Same fingerprint still passes the refund-namespace gate
    campaign
        .admit(&fp, CampaignPath::Refund)
        .await
        .expect("refund namespace keeps its own usage records");

    // And the refund gate itself is one-shot
    let again = campaign.admit(&fp, CampaignPath::Refund).await;
    assert!(matches!(again, Err(CampaignError::AlreadyUsed)));

    cleanup_fingerprint(&pool, &fp).await;
    reset_counter(&pool, 0).await;
}

#[tokio::test]
#[ignore]
async fn test_release_restores_slot_and_eligibility() {
    let (pool, campaign, _, _) = services();
    reset_counter(&pool, 0).await;

    let fp = fresh_fingerprint();
    campaign.admit(&fp, CampaignPath::Refund).await.unwrap();
    campaign.release(&fp, CampaignPath::Refund).await;

    let mut conn = pool.get().await.unwrap();
    let count: i64 = conn.get(RedisKeys::campaign_count()).await.unwrap_or(0);
    assert_eq!(count, 0);

    campaign
        .admit(&fp, CampaignPath::Refund)
        .await
        .expect("released fingerprint should be admitted again");

    cleanup_fingerprint(&pool, &fp).await;
    reset_counter(&pool, 0).await;
}

// ============================================================================
// COUPONS
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_coupon_validates_exactly_once() {
    let (_, _, coupons, _) = services();

    let code = coupons.issue(&fresh_fingerprint()).await.unwrap();

    let first = coupons.validate(&code).await;
    assert!(first.is_ok());

    let second = coupons.validate(&code).await;
    assert!(matches!(second, Err(CouponError::AlreadyUsed)));
}

#[tokio::test]
#[ignore]
async fn test_unknown_coupon_not_found() {
    let (_, _, coupons, _) = services();
    let result = coupons.validate("ZZZZ9999").await;
    assert!(matches!(result, Err(CouponError::NotFound)));
}

#[tokio::test]
#[ignore]
async fn test_coupon_expiry_window_edges() {
    let (pool, _, coupons, _) = services();
    let redis = RedisService::new(pool);

    // 23h59m old: still inside the window
    let young_code = "TESTYNG1";
    let young = CouponRecord {
        fingerprint: fresh_fingerprint(),
        created_at: Utc::now() - ChronoDuration::hours(23) - ChronoDuration::minutes(59),
        used: false,
        used_at: None,
    };
    redis
        .set_with_ttl(&RedisKeys::coupon(young_code), &young, 3600)
        .await
        .unwrap();
    assert!(coupons.validate(young_code).await.is_ok());

    // 25h old but not yet evicted: the application-level check fires
    let stale_code = "TESTOLD1";
    let stale = CouponRecord {
        fingerprint: fresh_fingerprint(),
        created_at: Utc::now() - ChronoDuration::hours(25),
        used: false,
        used_at: None,
    };
    redis
        .set_with_ttl(&RedisKeys::coupon(stale_code), &stale, 3600)
        .await
        .unwrap();
    let result = coupons.validate(stale_code).await;
    assert!(matches!(result, Err(CouponError::Expired)));

    redis.delete(&RedisKeys::coupon(young_code)).await.unwrap();
    redis.delete(&RedisKeys::coupon(stale_code)).await.unwrap();
}

// ============================================================================
// ACCESS TOKENS
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_access_token_survives_repeat_verification() {
    let (_, _, _, tokens) = services();

    let token = tokens.mint("pi_test_123", Some("quiz@example.com")).await.unwrap();

    let first = tokens.verify(&token).await.unwrap();
    assert_eq!(first.payment_intent_id, "pi_test_123");

    // Premium calls keep working within the 24h window
    let second = tokens.verify(&token).await.unwrap();
    assert_eq!(second.payment_intent_id, "pi_test_123");
    assert!(second.used);
}

#[tokio::test]
#[ignore]
async fn test_unknown_access_token_rejected() {
    let (_, _, _, tokens) = services();
    let result = tokens.verify("not-a-real-token").await;
    assert!(matches!(result, Err(TokenServiceError::NotFound)));
}
