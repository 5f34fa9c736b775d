use crate::services::advice_service::AdviceService;
use crate::services::campaign_service::CampaignService;
use crate::services::coupon_service::CouponService;
use crate::services::image_service::ImageService;
use crate::services::redis_service::RedisService;
use crate::services::stripe_service::StripeService;
use crate::services::token_service::TokenService;
use reqwest::Client as ReqwestClient;
use std::env;

/// Shared application state: the services built over the Redis pool and
/// the shared HTTP client.
#[derive(Clone)]
pub struct AppState {
    pub redis: RedisService,
    pub campaign: CampaignService,
    pub coupons: CouponService,
    pub tokens: TokenService,
    pub stripe: StripeService,
    pub advice: AdviceService,
    pub images: ImageService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let redis_pool = deadpool_redis::Config::from_url(&redis_url)
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .map_err(|e| anyhow::anyhow!("Failed to create Redis pool: {}", e))?;

        let http_client = ReqwestClient::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        let redis = RedisService::new(redis_pool);
        let coupons = CouponService::new(redis.clone());
        let campaign = CampaignService::new(redis.clone(), coupons.clone());
        let tokens = TokenService::new(redis.clone());
        let stripe = StripeService::new(http_client.clone());
        let advice = AdviceService::new(http_client.clone());
        let images = ImageService::new(http_client.clone());

        Ok(AppState {
            redis,
            campaign,
            coupons,
            tokens,
            stripe,
            advice,
            images,
        })
    }
}
