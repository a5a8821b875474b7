use crate::dtos::common::validate_positive_decimal;
use database::{
    admin::model::{AdminPermission, AdminRole},
    overrides::model::{OverrideAction, OverrideRecord},
    points::model::PointTransaction,
    settings::model::FeatureFlagsPatch,
    staff::model::StaffUser,
    withdrawal::model::Withdrawal,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// 超级管理员越权操作说明的最短长度
pub const MIN_OVERRIDE_REASON_LENGTH: usize = 20;

/// IANA 时区名（如 Africa/Lagos）或 UTC
fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    let well_formed = timezone == "UTC"
        || (timezone.contains('/')
            && timezone
                .split('/')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || "_-+".contains(c))));
    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_timezone"))
    }
}

/// ISO 4217 货币代码
fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_currency"))
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct UpdateTimezoneRequest {
    #[validate(custom = "validate_timezone")]
    pub timezone: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct UpdateCurrencyRequest {
    #[validate(custom = "validate_currency")]
    pub currency: String,
}

/// 部分更新功能开关
#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate, ToSchema)]
pub struct UpdateFeaturesRequest {
    pub referral_system: Option<bool>,
    pub withdrawal_system: Option<bool>,
    pub points_system: Option<bool>,
    pub notifications: Option<bool>,
}

impl From<UpdateFeaturesRequest> for FeatureFlagsPatch {
    fn from(req: UpdateFeaturesRequest) -> Self {
        FeatureFlagsPatch {
            referral_system: req.referral_system,
            withdrawal_system: req.withdrawal_system,
            points_system: req.points_system,
            notifications: req.notifications,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct UpdateRetentionRequest {
    #[validate(range(min = 1, max = 3650, message = "Retention must be between 1 and 3650 days"))]
    pub days: u32,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct UpdateWithdrawalLimitsRequest {
    #[validate(custom = "validate_positive_decimal")]
    pub minimum: Decimal,
    #[validate(custom = "validate_positive_decimal")]
    pub maximum: Decimal,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct OverrideRequest {
    pub action: OverrideAction,
    /// 提现ID或员工ID
    #[validate(length(min = 1))]
    pub resource_id: String,
    #[validate(length(min = 20, message = "Reason must be at least 20 characters"))]
    pub reason: String,
    /// points_adjustment 使用，带符号
    pub points: Option<i64>,
    /// user_status 使用
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OverrideResponse {
    pub record: OverrideRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawal: Option<Withdrawal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<StaffUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<PointTransaction>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct CreateAdminRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: AdminRole,
    /// 缺省时使用角色默认权限
    pub permissions: Option<Vec<AdminPermission>>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate, ToSchema)]
pub struct UpdateAdminRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    pub role: Option<AdminRole>,
    pub permissions: Option<Vec<AdminPermission>>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timezone_validation() {
        assert!(validate_timezone("Africa/Lagos").is_ok());
        assert!(validate_timezone("America/Argentina/Buenos_Aires").is_ok());
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("Lagos").is_err());
        assert!(validate_timezone("Africa/").is_err());
    }

    #[test]
    fn test_currency_validation() {
        assert!(validate_currency("NGN").is_ok());
        assert!(validate_currency("ngn").is_err());
        assert!(validate_currency("NAIRA").is_err());
    }

    #[test]
    fn test_retention_range() {
        assert!(UpdateRetentionRequest { days: 0 }.validate().is_err());
        assert!(UpdateRetentionRequest { days: 1 }.validate().is_ok());
        assert!(UpdateRetentionRequest { days: 3650 }.validate().is_ok());
        assert!(UpdateRetentionRequest { days: 3651 }.validate().is_err());
    }

    #[test]
    fn test_override_reason_length() {
        let req = OverrideRequest {
            action: OverrideAction::UserStatus,
            resource_id: "3".to_string(),
            reason: "too short".to_string(),
            points: None,
            is_active: Some(false),
        };
        assert!(req.validate().is_err());

        let req = OverrideRequest {
            reason: "Account compromised, disabling pending review".to_string(),
            ..req
        };
        assert!(req.validate().is_ok());
    }
}
