use chrono::prelude::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

use crate::pagination::contains_ignore_case;

/// 提现状态；旧状态名 completed 等同于 paid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Processing,
    #[serde(alias = "completed")]
    Paid,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Processing => "processing",
            WithdrawalStatus::Paid => "paid",
            WithdrawalStatus::Rejected => "rejected",
        }
    }

    /// pending → approved | rejected
    /// approved → processing | rejected
    /// processing → paid | rejected
    pub fn can_transition_to(&self, next: WithdrawalStatus) -> bool {
        use WithdrawalStatus::*;

        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, Processing)
                | (Approved, Rejected)
                | (Processing, Paid)
                | (Processing, Rejected)
        )
    }

    /// 仍占用预留积分的状态
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            WithdrawalStatus::Pending | WithdrawalStatus::Approved | WithdrawalStatus::Processing
        )
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            "processing" => Ok(WithdrawalStatus::Processing),
            "paid" | "completed" => Ok(WithdrawalStatus::Paid),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            other => Err(format!("Unknown withdrawal status: {}", other)),
        }
    }
}

/// 提现申请，汇率在申请时锁定
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Withdrawal {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub points: i64,
    /// 锁定汇率（每 1 货币单位所需积分）
    pub conversion_rate: Decimal,
    pub amount: Decimal,
    pub currency: String,
    pub status: WithdrawalStatus,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<String>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewWithdrawal {
    pub user_id: i64,
    pub points: i64,
    pub conversion_rate: Decimal,
    pub amount: Decimal,
    pub currency: String,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct WithdrawalQuery {
    pub status: Option<WithdrawalStatus>,
    pub user_id: Option<i64>,
    /// 匹配员工姓名或账户名
    pub search: Option<String>,
}

impl WithdrawalQuery {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, withdrawal: &Withdrawal) -> bool {
        if self.status.is_some_and(|s| s != withdrawal.status) {
            return false;
        }
        if self.user_id.is_some_and(|id| id != withdrawal.user_id) {
            return false;
        }
        match self.search.as_deref().filter(|s| !s.is_empty()) {
            Some(search) => {
                contains_ignore_case(&withdrawal.user_name, search)
                    || contains_ignore_case(&withdrawal.account_name, search)
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WithdrawalTransition {
    pub status: WithdrawalStatus,
    pub processed_by: String,
    pub rejection_reason: Option<String>,
    /// 越过状态机校验（超级管理员 override）
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use WithdrawalStatus::*;

        assert!(Pending.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Paid));
        assert!(Processing.can_transition_to(Rejected));

        assert!(!Pending.can_transition_to(Paid));
        assert!(!Pending.can_transition_to(Processing));
        assert!(!Paid.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
    }

    #[test]
    fn test_completed_alias() {
        assert_eq!("completed".parse::<WithdrawalStatus>().unwrap(), WithdrawalStatus::Paid);

        let parsed: WithdrawalStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, WithdrawalStatus::Paid);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"paid\"");
    }
}
