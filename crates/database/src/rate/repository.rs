use crate::{
    rate::model::{ConversionRate, RateStatus},
    Database,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use utils::{AppError, AppResult};

pub type DynRateRepository = Arc<dyn RateRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait RateRepositoryTrait {
    /// 按生效时间倒序
    async fn list_rates(&self) -> AppResult<Vec<ConversionRate>>;

    /// 当前生效汇率：窗口包含 now 且生效时间最新的一条
    async fn current_rate(&self, now: DateTime<Utc>) -> AppResult<ConversionRate>;

    /// 关闭当前生效汇率并立即启用新汇率
    async fn replace_active_rate(&self, rate: Decimal, created_by: &str) -> AppResult<ConversionRate>;

    async fn schedule_rate(
        &self,
        rate: Decimal,
        effective_from: DateTime<Utc>,
        created_by: &str,
    ) -> AppResult<ConversionRate>;

    async fn delete_scheduled_rate(&self, id: i64, now: DateTime<Utc>) -> AppResult<ConversionRate>;

    /// 到期的计划汇率生效后，关闭被其取代的旧汇率；返回被关闭的数量
    async fn close_superseded_rates(&self, now: DateTime<Utc>) -> AppResult<usize>;
}

#[async_trait]
impl RateRepositoryTrait for Database {
    async fn list_rates(&self) -> AppResult<Vec<ConversionRate>> {
        let mut rates = self.conversion_rates.read().await.clone();
        rates.sort_by(|a, b| b.effective_from.cmp(&a.effective_from).then(b.id.cmp(&a.id)));
        Ok(rates)
    }

    async fn current_rate(&self, now: DateTime<Utc>) -> AppResult<ConversionRate> {
        let rates = self.conversion_rates.read().await;

        rates
            .iter()
            .filter(|r| r.status_at(now) == RateStatus::Active)
            .max_by(|a, b| a.effective_from.cmp(&b.effective_from).then(a.id.cmp(&b.id)))
            .cloned()
            .ok_or_else(|| AppError::NotFound("No active conversion rate".to_string()))
    }

    async fn replace_active_rate(&self, rate: Decimal, created_by: &str) -> AppResult<ConversionRate> {
        let mut rates = self.conversion_rates.write().await;
        let now = Utc::now();

        for active in rates.iter_mut().filter(|r| r.status_at(now) == RateStatus::Active) {
            active.effective_to = Some(now);
        }

        let created = ConversionRate {
            id: self.conversion_rates.next_id(),
            rate,
            effective_from: now,
            effective_to: None,
            created_by: created_by.to_string(),
            created_at: now,
        };
        rates.push(created.clone());

        info!("💱 汇率更新为 {} (by {})", rate, created_by);
        Ok(created)
    }

    async fn schedule_rate(
        &self,
        rate: Decimal,
        effective_from: DateTime<Utc>,
        created_by: &str,
    ) -> AppResult<ConversionRate> {
        let mut rates = self.conversion_rates.write().await;
        let now = Utc::now();

        if effective_from <= now {
            return Err(AppError::BadRequest("Effective date must be in the future".to_string()));
        }
        if rates.iter().any(|r| r.effective_from == effective_from) {
            return Err(AppError::Conflict(format!(
                "A rate is already scheduled for {}",
                effective_from.to_rfc3339()
            )));
        }

        let created = ConversionRate {
            id: self.conversion_rates.next_id(),
            rate,
            effective_from,
            effective_to: None,
            created_by: created_by.to_string(),
            created_at: now,
        };
        rates.push(created.clone());

        info!("🗓️ 计划汇率 {} 于 {} 生效", rate, effective_from);
        Ok(created)
    }

    async fn delete_scheduled_rate(&self, id: i64, now: DateTime<Utc>) -> AppResult<ConversionRate> {
        let mut rates = self.conversion_rates.write().await;

        let index = rates
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound("Conversion rate not found".to_string()))?;

        if rates[index].status_at(now) != RateStatus::Scheduled {
            return Err(AppError::BadRequest("Only scheduled rates can be deleted".to_string()));
        }

        Ok(rates.remove(index))
    }

    async fn close_superseded_rates(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut rates = self.conversion_rates.write().await;

        let Some((latest_id, latest_from)) = rates
            .iter()
            .filter(|r| r.status_at(now) == RateStatus::Active)
            .max_by(|a, b| a.effective_from.cmp(&b.effective_from).then(a.id.cmp(&b.id)))
            .map(|r| (r.id, r.effective_from))
        else {
            return Ok(0);
        };

        let mut closed = 0;
        for rate in rates
            .iter_mut()
            .filter(|r| r.id != latest_id && r.status_at(now) == RateStatus::Active)
        {
            rate.effective_to = Some(latest_from);
            closed += 1;
        }

        if closed > 0 {
            info!("💱 汇率 {} 已生效，关闭 {} 条旧汇率", latest_id, closed);
        }
        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_seeded_current_rate_is_ten() {
        let db = Database::new_for_test().await;
        let current = db.current_rate(Utc::now()).await.unwrap();
        assert_eq!(current.rate, Decimal::from(10));
        assert!(current.effective_to.is_none());
    }

    #[tokio::test]
    async fn test_replace_closes_previous() {
        let db = Database::new_for_test().await;
        let previous = db.current_rate(Utc::now()).await.unwrap();

        let created = db.replace_active_rate(Decimal::from(12), "admin-1").await.unwrap();
        let current = db.current_rate(Utc::now()).await.unwrap();
        assert_eq!(current.id, created.id);

        let rates = db.list_rates().await.unwrap();
        let closed = rates.iter().find(|r| r.id == previous.id).unwrap();
        assert!(closed.effective_to.is_some());
    }

    #[tokio::test]
    async fn test_scheduled_rate_lifecycle() {
        let db = Database::new_for_test().await;
        let now = Utc::now();

        let past = db.schedule_rate(Decimal::from(9), now - Duration::hours(1), "admin-1").await;
        assert!(matches!(past, Err(AppError::BadRequest(_))));

        let scheduled = db
            .schedule_rate(Decimal::from(15), now + Duration::days(2), "admin-1")
            .await
            .unwrap();
        assert_eq!(db.current_rate(now).await.unwrap().rate, Decimal::from(10));

        // 到期后成为当前汇率，housekeeping 关闭旧汇率
        let later = now + Duration::days(3);
        assert_eq!(db.current_rate(later).await.unwrap().id, scheduled.id);
        assert_eq!(db.close_superseded_rates(later).await.unwrap(), 1);
        assert_eq!(db.close_superseded_rates(later).await.unwrap(), 0);

        let active = db.current_rate(now).await.unwrap();
        assert!(matches!(
            db.delete_scheduled_rate(active.id, now).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_scheduled() {
        let db = Database::new_for_test().await;
        let now = Utc::now();
        let scheduled = db
            .schedule_rate(Decimal::from(11), now + Duration::days(1), "admin-1")
            .await
            .unwrap();

        db.delete_scheduled_rate(scheduled.id, now).await.unwrap();
        assert!(matches!(
            db.delete_scheduled_rate(scheduled.id, now).await,
            Err(AppError::NotFound(_))
        ));
    }
}
