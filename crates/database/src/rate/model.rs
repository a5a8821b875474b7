use chrono::prelude::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 积分兑换汇率：rate 积分 = 1 货币单位
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversionRate {
    pub id: i64,
    pub rate: Decimal,
    pub effective_from: DateTime<Utc>,
    pub effective_to: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RateStatus {
    Scheduled,
    Active,
    Expired,
}

impl ConversionRate {
    pub fn status_at(&self, now: DateTime<Utc>) -> RateStatus {
        if self.effective_from > now {
            RateStatus::Scheduled
        } else if self.effective_to.map_or(true, |to| to > now) {
            RateStatus::Active
        } else {
            RateStatus::Expired
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_window() {
        let now = Utc::now();
        let mut rate = ConversionRate {
            id: 1,
            rate: Decimal::from(10),
            effective_from: now - Duration::days(1),
            effective_to: None,
            created_by: "admin-1".to_string(),
            created_at: now,
        };
        assert_eq!(rate.status_at(now), RateStatus::Active);

        rate.effective_to = Some(now);
        assert_eq!(rate.status_at(now), RateStatus::Expired);

        rate.effective_from = now + Duration::days(1);
        rate.effective_to = None;
        assert_eq!(rate.status_at(now), RateStatus::Scheduled);
    }
}
