use crate::dtos::common::validate_positive_decimal;
use chrono::{DateTime, Utc};
use database::{
    pagination::Pagination,
    points::model::{PointTransaction, TransactionQuery, TransactionType},
    rate::model::{ConversionRate, RateStatus},
    staff::model::StaffUser,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// 汇率记录及其当前状态
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RateView {
    #[serde(flatten)]
    pub rate: ConversionRate,
    pub status: RateStatus,
}

impl RateView {
    pub fn at(rate: ConversionRate, now: DateTime<Utc>) -> Self {
        let status = rate.status_at(now);
        Self { rate, status }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PointsConfig {
    pub current_rate: Decimal,
    pub currency: String,
    pub minimum_withdrawal: Decimal,
    pub maximum_withdrawal: Decimal,
    pub rate_history: Vec<RateView>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct UpdateRateRequest {
    /// 每1货币单位对应的积分数
    #[validate(custom = "validate_positive_decimal")]
    pub rate: Decimal,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct ScheduleRateRequest {
    #[validate(custom = "validate_positive_decimal")]
    pub rate: Decimal,
    pub effective_date: DateTime<Utc>,
}

/// 积分调整类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Add,
    Remove,
    Expire,
    Freeze,
    Unfreeze,
}

fn validate_non_zero(points: i64) -> Result<(), ValidationError> {
    if points == 0 {
        return Err(ValidationError::new("must_not_be_zero"));
    }
    Ok(())
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct AdjustPointsRequest {
    /// 未指定 kind 时正数为增加、负数为扣减
    #[validate(custom = "validate_non_zero")]
    pub points: i64,
    #[validate(length(min = 3, max = 500, message = "A reason is required"))]
    pub reason: String,
    pub kind: Option<AdjustmentKind>,
}

impl AdjustPointsRequest {
    /// 归一化为 (类型, 正数积分)
    pub fn resolve(&self) -> (AdjustmentKind, i64) {
        let kind = self.kind.unwrap_or(if self.points > 0 {
            AdjustmentKind::Add
        } else {
            AdjustmentKind::Remove
        });
        (kind, self.points.abs())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdjustPointsResponse {
    pub user: StaffUser,
    pub transaction: PointTransaction,
}

/// 积分流水分页查询
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct TransactionListQuery {
    pub user_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    /// 按员工姓名或描述搜索
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl TransactionListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }

    pub fn to_query(&self) -> TransactionQuery {
        TransactionQuery {
            user_id: self.user_id,
            kind: self.kind,
            search: self.search.clone(),
            from: self.from,
            to: self.to,
        }
    }
}

/// 积分历史（不分页）
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct PointsHistoryQuery {
    pub user_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
}

impl PointsHistoryQuery {
    pub fn to_query(&self) -> TransactionQuery {
        TransactionQuery {
            user_id: self.user_id,
            kind: self.kind,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjust(points: i64, kind: Option<AdjustmentKind>) -> AdjustPointsRequest {
        AdjustPointsRequest {
            points,
            reason: "Quarterly bonus".to_string(),
            kind,
        }
    }

    #[test]
    fn test_resolve_adjustment() {
        assert_eq!(adjust(250, None).resolve(), (AdjustmentKind::Add, 250));
        assert_eq!(adjust(-100, None).resolve(), (AdjustmentKind::Remove, 100));
        assert_eq!(
            adjust(-40, Some(AdjustmentKind::Freeze)).resolve(),
            (AdjustmentKind::Freeze, 40)
        );
    }

    #[test]
    fn test_zero_points_rejected() {
        assert!(adjust(0, None).validate().is_err());
        assert!(adjust(1, None).validate().is_ok());
    }

    #[test]
    fn test_transaction_query_type_param() {
        let query: TransactionListQuery = serde_urlencoded::from_str("type=refund&user_id=4&page=2").unwrap();
        let tx_query = query.to_query();
        assert_eq!(tx_query.kind, Some(TransactionType::Refund));
        assert_eq!(tx_query.user_id, Some(4));
        assert_eq!(query.pagination().page, 2);
    }
}
