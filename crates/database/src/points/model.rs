use chrono::prelude::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Earned,
    Bonus,
    Deduction,
    Withdrawal,
    Refund,
    Expired,
    Frozen,
    Unfrozen,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Earned => "earned",
            TransactionType::Bonus => "bonus",
            TransactionType::Deduction => "deduction",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Refund => "refund",
            TransactionType::Expired => "expired",
            TransactionType::Frozen => "frozen",
            TransactionType::Unfrozen => "unfrozen",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earned" => Ok(TransactionType::Earned),
            "bonus" => Ok(TransactionType::Bonus),
            "deduction" => Ok(TransactionType::Deduction),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            "refund" => Ok(TransactionType::Refund),
            "expired" => Ok(TransactionType::Expired),
            "frozen" => Ok(TransactionType::Frozen),
            "unfrozen" => Ok(TransactionType::Unfrozen),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

/// 积分流水
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PointTransaction {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// 对总积分的变动（有符号）
    pub amount: i64,
    /// 对冻结积分的变动（有符号）
    pub frozen_amount: i64,
    /// 变动后的总积分快照
    pub balance: i64,
    pub description: String,
    pub referral_id: Option<i64>,
    pub withdrawal_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// 一次积分变动请求，由 ledger 原子地应用到员工与流水上
#[derive(Debug, Clone)]
pub struct PointsChange {
    pub user_id: i64,
    pub kind: TransactionType,
    pub amount: i64,
    pub frozen_amount: i64,
    pub description: String,
    pub referral_id: Option<i64>,
    pub withdrawal_id: Option<i64>,
    /// 扣减超过可用积分时截断到 0，而不是报错
    pub clamp_at_zero: bool,
}

impl PointsChange {
    pub fn new(user_id: i64, kind: TransactionType, amount: i64, description: impl Into<String>) -> Self {
        Self {
            user_id,
            kind,
            amount,
            frozen_amount: 0,
            description: description.into(),
            referral_id: None,
            withdrawal_id: None,
            clamp_at_zero: false,
        }
    }

    pub fn frozen(mut self, frozen_amount: i64) -> Self {
        self.frozen_amount = frozen_amount;
        self
    }

    pub fn for_referral(mut self, referral_id: i64) -> Self {
        self.referral_id = Some(referral_id);
        self
    }

    pub fn for_withdrawal(mut self, withdrawal_id: i64) -> Self {
        self.withdrawal_id = Some(withdrawal_id);
        self
    }

    pub fn clamped(mut self) -> Self {
        self.clamp_at_zero = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub user_id: Option<i64>,
    pub kind: Option<TransactionType>,
    /// 匹配用户名或描述
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TransactionQuery {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, tx: &PointTransaction) -> bool {
        if self.user_id.is_some_and(|id| id != tx.user_id) {
            return false;
        }
        if self.kind.is_some_and(|kind| kind != tx.kind) {
            return false;
        }
        if self.from.is_some_and(|from| tx.created_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| tx.created_at > to) {
            return false;
        }
        match self.search.as_deref().filter(|s| !s.is_empty()) {
            Some(search) => {
                crate::pagination::contains_ignore_case(&tx.user_name, search)
                    || crate::pagination::contains_ignore_case(&tx.description, search)
            }
            None => true,
        }
    }
}
