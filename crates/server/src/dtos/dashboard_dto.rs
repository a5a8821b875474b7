use chrono::{DateTime, Utc};
use database::referral::model::ReferralStats;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserCounts {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct WithdrawalCounts {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub processing: u64,
    pub paid: u64,
    pub rejected: u64,
}

/// 管理后台总览
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub users: UserCounts,
    pub referrals: ReferralStats,
    pub withdrawals: WithdrawalCounts,
    /// 全部员工的积分余额之和
    pub total_points: i64,
    /// 已打款金额
    pub total_paid_amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MonthlyCount {
    /// YYYY-MM
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MonthlyAmount {
    pub month: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopPerformer {
    pub user_id: i64,
    pub name: String,
    pub department: String,
    pub successful_referrals: i64,
    pub total_referrals: i64,
    pub points_balance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepartmentShare {
    pub department: String,
    pub count: u64,
    /// 保留一位小数
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardCharts {
    pub referrals_by_month: Vec<MonthlyCount>,
    pub paid_by_month: Vec<MonthlyAmount>,
    pub top_performers: Vec<TopPerformer>,
    pub departments: Vec<DepartmentShare>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Referral,
    Withdrawal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityItem {
    /// ref-1 / withdrawal-1
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Warning,
    Info,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardAlert {
    pub id: u32,
    #[serde(rename = "type")]
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
    pub count: u64,
    pub link: String,
}
