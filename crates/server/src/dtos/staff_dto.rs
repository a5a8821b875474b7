use crate::dtos::auth_dto::StaffSummary;
use chrono::{DateTime, Utc};
use database::{
    notification::model::Notification,
    points::model::{PointTransaction, TransactionType},
    referral::model::Referral,
    staff::model::StaffUpdate,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffStats {
    pub total_referrals: i64,
    pub successful_referrals: i64,
    pub pending_referrals: u64,
    pub total_points: i64,
    pub available_points: i64,
    /// 已打款的提现笔数
    pub total_withdrawals: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffDashboard {
    pub user: StaffSummary,
    pub stats: StaffStats,
    pub recent_referrals: Vec<Referral>,
    pub recent_transactions: Vec<PointTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReferralCodeResponse {
    pub referral_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PointsBalance {
    pub balance: i64,
    pub frozen: i64,
    pub available: i64,
    /// available / rate，保留两位小数
    pub cash_value: Decimal,
    pub rate: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversionRateInfo {
    pub rate: Decimal,
    pub currency: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct StaffPointsQuery {
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HoursSyncStatus {
    pub last_synced: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationList {
    pub items: Vec<Notification>,
    pub total: usize,
    pub unread_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub updated: usize,
}

/// 员工可自行修改的资料
#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub location: Option<String>,
}

impl From<UpdateProfileRequest> for StaffUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        StaffUpdate {
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            location: req.location,
            ..Default::default()
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct AvatarRequest {
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvatarResponse {
    pub avatar_url: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct SupportRequestBody {
    #[validate(length(min = 3, max = 200, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 10, max = 5000, message = "Message must be at least 10 characters"))]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_cannot_touch_email() {
        let update: StaffUpdate = UpdateProfileRequest {
            phone: Some("+2348012345678".to_string()),
            ..Default::default()
        }
        .into();

        assert_eq!(update.phone.as_deref(), Some("+2348012345678"));
        assert!(update.email.is_none());
        assert!(update.department.is_none());
    }

    #[test]
    fn test_avatar_url_validation() {
        assert!(AvatarRequest {
            avatar_url: "https://i.pravatar.cc/150?img=3".to_string()
        }
        .validate()
        .is_ok());
        assert!(AvatarRequest {
            avatar_url: "not a url".to_string()
        }
        .validate()
        .is_err());
    }
}
