/// Payment - Stripe adapter endpoints
///
/// Endpoints:
/// - POST /api/v1/payment/create-intent - ¥500 premium PaymentIntent
/// - POST /api/v1/payment/webhook       - Stripe event sink (raw body)
/// - POST /api/v1/payment/refund        - Paid-refund campaign path
/// - POST /api/v1/payment/verify-token  - Premium access-token check
pub mod create_intent;
pub mod refund;
pub mod verify_token;
pub mod webhook;

pub use create_intent::handle_create_intent;
pub use refund::handle_refund;
pub use verify_token::handle_verify_token;
pub use webhook::handle_webhook;
