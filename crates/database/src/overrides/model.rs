use chrono::prelude::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverrideAction {
    ForceApproveWithdrawal,
    ForceRejectWithdrawal,
    PointsAdjustment,
    UserStatus,
}

impl OverrideAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideAction::ForceApproveWithdrawal => "force_approve_withdrawal",
            OverrideAction::ForceRejectWithdrawal => "force_reject_withdrawal",
            OverrideAction::PointsAdjustment => "points_adjustment",
            OverrideAction::UserStatus => "user_status",
        }
    }
}

/// 超级管理员越权操作记录
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OverrideRecord {
    pub id: i64,
    pub action: OverrideAction,
    pub resource_id: String,
    pub reason: String,
    pub admin_id: String,
    pub admin_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOverrideRecord {
    pub action: OverrideAction,
    pub resource_id: String,
    pub reason: String,
    pub admin_id: String,
    pub admin_name: String,
}
