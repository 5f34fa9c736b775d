/// Campaign - capacity-limited premium promotion
///
/// Endpoints:
/// - GET  /api/v1/campaign/status - Remaining slots + eligibility
/// - POST /api/v1/campaign/redeem - Claim a free slot for a share/feedback action
pub mod redeem;
pub mod status;
pub mod templates;

pub use templates::{CampaignRedeemRequest, CampaignRedeemResponse, CampaignStatusResponse};

pub use redeem::handle_redeem;
pub use status::handle_status;
