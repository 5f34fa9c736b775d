pub mod advice_service;
pub mod campaign_service;
pub mod coupon_service;
pub mod image_service;
pub mod redis_service;
pub mod stripe_service;
pub mod token_service;

pub use advice_service::AdviceService;
pub use campaign_service::CampaignService;
pub use coupon_service::CouponService;
pub use image_service::ImageService;
pub use redis_service::RedisService;
pub use stripe_service::StripeService;
pub use token_service::TokenService;
