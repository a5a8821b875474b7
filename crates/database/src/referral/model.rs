use chrono::prelude::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

use crate::pagination::contains_ignore_case;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    Pending,
    Approved,
    Completed,
    Rejected,
}

impl ReferralStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "pending",
            ReferralStatus::Approved => "approved",
            ReferralStatus::Completed => "completed",
            ReferralStatus::Rejected => "rejected",
        }
    }

    /// pending → approved | rejected
    /// approved → completed | rejected
    pub fn can_transition_to(&self, next: ReferralStatus) -> bool {
        matches!(
            (self, next),
            (ReferralStatus::Pending, ReferralStatus::Approved)
                | (ReferralStatus::Pending, ReferralStatus::Rejected)
                | (ReferralStatus::Approved, ReferralStatus::Completed)
                | (ReferralStatus::Approved, ReferralStatus::Rejected)
        )
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferralStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReferralStatus::Pending),
            "approved" => Ok(ReferralStatus::Approved),
            "completed" => Ok(ReferralStatus::Completed),
            "rejected" => Ok(ReferralStatus::Rejected),
            other => Err(format!("Unknown referral status: {}", other)),
        }
    }
}

/// 推荐记录
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Referral {
    pub id: i64,
    /// 推荐人（员工）ID
    pub user_id: i64,
    pub referrer_name: String,
    pub referrer_code: String,
    pub referee_name: String,
    pub referee_email: String,
    pub referee_phone: String,
    pub status: ReferralStatus,
    pub points_awarded: i64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReferral {
    pub user_id: i64,
    pub referee_name: String,
    pub referee_email: String,
    pub referee_phone: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReferralQuery {
    pub status: Option<ReferralStatus>,
    pub user_id: Option<i64>,
    /// 匹配推荐人、被推荐人姓名及被推荐人邮箱
    pub search: Option<String>,
}

impl ReferralQuery {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, referral: &Referral) -> bool {
        if self.status.is_some_and(|s| s != referral.status) {
            return false;
        }
        if self.user_id.is_some_and(|id| id != referral.user_id) {
            return false;
        }
        match self.search.as_deref().filter(|s| !s.is_empty()) {
            Some(search) => {
                contains_ignore_case(&referral.referrer_name, search)
                    || contains_ignore_case(&referral.referee_name, search)
                    || contains_ignore_case(&referral.referee_email, search)
            }
            None => true,
        }
    }
}

/// 状态变更请求
#[derive(Debug, Clone)]
pub struct ReferralTransition {
    pub status: ReferralStatus,
    pub notes: Option<String>,
    /// 完成时奖励给推荐人的积分
    pub reward_points: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ReferralStats {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub completed: u64,
    pub rejected: u64,
}

impl ReferralStats {
    pub fn from_referrals<'a>(referrals: impl IntoIterator<Item = &'a Referral>) -> Self {
        referrals.into_iter().fold(Self::default(), |mut stats, r| {
            stats.total += 1;
            match r.status {
                ReferralStatus::Pending => stats.pending += 1,
                ReferralStatus::Approved => stats.approved += 1,
                ReferralStatus::Completed => stats.completed += 1,
                ReferralStatus::Rejected => stats.rejected += 1,
            }
            stats
        })
    }
}
