use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::campaign_service::CampaignAction;

// ============================================================================
// REQUEST MODELS
// ============================================================================

/// Request to redeem a free campaign slot
#[derive(Debug, Deserialize)]
pub struct CampaignRedeemRequest {
    /// Qualifying action: "share" or "feedback"
    pub action: String,

    /// Action payload: {platform} for share, {rating, comment?} for feedback
    #[serde(default)]
    pub action_data: Value,
}

// ============================================================================
// RESPONSE MODELS
// ============================================================================

/// Campaign state for the requesting fingerprint
#[derive(Debug, Serialize)]
pub struct CampaignStatusResponse {
    /// Slots still available
    pub remaining: i64,

    /// Whether the campaign accepts new redemptions at all
    pub active: bool,

    /// Whether this fingerprint can still redeem
    pub user_eligible: bool,
}

/// Successful redemption
#[derive(Debug, Serialize)]
pub struct CampaignRedeemResponse {
    /// Single-use premium coupon
    pub coupon_code: String,

    /// Coupon lifetime
    pub expires_in_hours: i64,
}

// ============================================================================
// VALIDATION
// ============================================================================

impl CampaignRedeemRequest {
    /// Validates the action and its payload shape
    pub fn validate(&self) -> Result<CampaignAction, String> {
        let action = CampaignAction::parse(&self.action)
            .ok_or_else(|| format!("Invalid action: {}. Must be share or feedback", self.action))?;

        match action {
            CampaignAction::Share => {
                let platform = self.action_data.get("platform").and_then(|p| p.as_str());
                if platform.map_or(true, |p| p.trim().is_empty()) {
                    return Err("Share action requires a platform name".to_string());
                }
            }
            CampaignAction::Feedback => {
                let rating = self.action_data.get("rating").and_then(|r| r.as_i64());
                match rating {
                    Some(r) if (1..=5).contains(&r) => {}
                    Some(r) => return Err(format!("Invalid rating: {}. Must be 1 to 5", r)),
                    None => return Err("Feedback action requires a rating".to_string()),
                }
            }
        }

        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_share_requires_platform() {
        let ok = CampaignRedeemRequest {
            action: "share".to_string(),
            action_data: json!({"platform": "x"}),
        };
        assert_eq!(ok.validate().unwrap(), CampaignAction::Share);

        let missing = CampaignRedeemRequest {
            action: "share".to_string(),
            action_data: json!({}),
        };
        assert!(missing.validate().is_err());

        let blank = CampaignRedeemRequest {
            action: "share".to_string(),
            action_data: json!({"platform": "  "}),
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_feedback_requires_rating_in_range() {
        for rating in 1..=5 {
            let req = CampaignRedeemRequest {
                action: "feedback".to_string(),
                action_data: json!({"rating": rating, "comment": "fun"}),
            };
            assert_eq!(req.validate().unwrap(), CampaignAction::Feedback);
        }

        let out_of_range = CampaignRedeemRequest {
            action: "feedback".to_string(),
            action_data: json!({"rating": 6}),
        };
        assert!(out_of_range.validate().is_err());

        let missing = CampaignRedeemRequest {
            action: "feedback".to_string(),
            action_data: json!({"comment": "no rating"}),
        };
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_unknown_action_rejected() {
        let req = CampaignRedeemRequest {
            action: "retweet".to_string(),
            action_data: json!({}),
        };
        assert!(req.validate().is_err());
    }
}
