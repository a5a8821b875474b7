use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 系统设置（单例）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SystemSettings {
    pub timezone: String,
    pub currency: String,
    /// 单笔最小提现金额（货币单位）
    pub minimum_withdrawal: Decimal,
    pub maximum_withdrawal: Decimal,
    pub features: FeatureFlags,
    pub retention_days: u32,
}

impl SystemSettings {
    pub fn new(currency: &str) -> Self {
        Self {
            timezone: "Africa/Lagos".to_string(),
            currency: currency.to_string(),
            minimum_withdrawal: Decimal::from(5_000),
            maximum_withdrawal: Decimal::from(100_000),
            features: FeatureFlags::default(),
            retention_days: 365,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct FeatureFlags {
    pub referral_system: bool,
    pub withdrawal_system: bool,
    pub points_system: bool,
    pub notifications: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            referral_system: true,
            withdrawal_system: true,
            points_system: true,
            notifications: true,
        }
    }
}

/// 部分合并
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub struct FeatureFlagsPatch {
    pub referral_system: Option<bool>,
    pub withdrawal_system: Option<bool>,
    pub points_system: Option<bool>,
    pub notifications: Option<bool>,
}

impl FeatureFlags {
    pub fn merge(&mut self, patch: FeatureFlagsPatch) {
        if let Some(v) = patch.referral_system {
            self.referral_system = v;
        }
        if let Some(v) = patch.withdrawal_system {
            self.withdrawal_system = v;
        }
        if let Some(v) = patch.points_system {
            self.points_system = v;
        }
        if let Some(v) = patch.notifications {
            self.notifications = v;
        }
    }
}
