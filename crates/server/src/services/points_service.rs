use crate::{
    dtos::{
        common::PageData,
        points_dto::{
            AdjustPointsRequest, AdjustPointsResponse, AdjustmentKind, PointsConfig, PointsHistoryQuery, RateView,
            ScheduleRateRequest, TransactionListQuery,
        },
    },
    extractors::Actor,
    services::activity,
};
use async_trait::async_trait;
use chrono::Utc;
use database::{
    notification::model::{NewNotification, NotificationType},
    points::{
        model::{PointTransaction, PointsChange, TransactionType},
        repository::PointsRepositoryTrait,
    },
    rate::{model::ConversionRate, repository::RateRepositoryTrait},
    settings::repository::SettingsRepositoryTrait,
    Database,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};
use utils::{AppError, AppResult};

pub type DynPointsService = Arc<dyn PointsServiceTrait + Send + Sync>;

#[async_trait]
pub trait PointsServiceTrait {
    async fn config(&self) -> AppResult<PointsConfig>;

    /// 立即替换当前汇率
    async fn update_rate(&self, actor: &Actor, rate: Decimal) -> AppResult<ConversionRate>;

    async fn adjust_user_points(
        &self,
        actor: &Actor,
        user_id: i64,
        request: AdjustPointsRequest,
    ) -> AppResult<AdjustPointsResponse>;

    async fn history(&self, query: PointsHistoryQuery) -> AppResult<Vec<PointTransaction>>;

    async fn transactions(&self, query: TransactionListQuery) -> AppResult<PageData<PointTransaction>>;

    async fn schedule_rate(&self, actor: &Actor, request: ScheduleRateRequest) -> AppResult<ConversionRate>;

    async fn delete_scheduled_rate(&self, actor: &Actor, id: i64) -> AppResult<ConversionRate>;
}

/// 把一次人工调整映射为记账变动
///
/// points 为正数；冻结/解冻只移动冻结额，不改变总积分
pub fn adjustment_change(user_id: i64, kind: AdjustmentKind, points: i64, reason: &str) -> PointsChange {
    match kind {
        AdjustmentKind::Add => PointsChange::new(user_id, TransactionType::Bonus, points, reason),
        AdjustmentKind::Remove => PointsChange::new(user_id, TransactionType::Deduction, -points, reason),
        AdjustmentKind::Expire => PointsChange::new(user_id, TransactionType::Expired, -points, reason).clamped(),
        AdjustmentKind::Freeze => PointsChange::new(user_id, TransactionType::Frozen, 0, reason).frozen(points),
        AdjustmentKind::Unfreeze => PointsChange::new(user_id, TransactionType::Unfrozen, 0, reason).frozen(-points),
    }
}

fn adjustment_message(tx: &PointTransaction) -> String {
    match tx.kind {
        TransactionType::Bonus => format!("{} points were added to your balance: {}", tx.amount, tx.description),
        TransactionType::Deduction => format!("{} points were deducted: {}", -tx.amount, tx.description),
        TransactionType::Expired => format!("{} points have expired: {}", -tx.amount, tx.description),
        TransactionType::Frozen => format!("{} points have been frozen: {}", tx.frozen_amount, tx.description),
        TransactionType::Unfrozen => format!("{} points have been unfrozen: {}", -tx.frozen_amount, tx.description),
        _ => tx.description.clone(),
    }
}

#[derive(Clone)]
pub struct PointsService {
    database: Arc<Database>,
}

impl PointsService {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl PointsServiceTrait for PointsService {
    async fn config(&self) -> AppResult<PointsConfig> {
        let now = Utc::now();
        let current = self.database.current_rate(now).await?;
        let settings = self.database.get_settings().await?;
        let rate_history = self
            .database
            .list_rates()
            .await?
            .into_iter()
            .map(|rate| RateView::at(rate, now))
            .collect();

        Ok(PointsConfig {
            current_rate: current.rate,
            currency: settings.currency,
            minimum_withdrawal: settings.minimum_withdrawal,
            maximum_withdrawal: settings.maximum_withdrawal,
            rate_history,
        })
    }

    async fn update_rate(&self, actor: &Actor, rate: Decimal) -> AppResult<ConversionRate> {
        if rate <= Decimal::ZERO {
            return Err(AppError::BadRequest("Rate must be greater than zero".to_string()));
        }

        let previous = self.database.current_rate(Utc::now()).await.ok();
        let created = self.database.replace_active_rate(rate, &actor.user.subject).await?;

        let description = match previous {
            Some(previous) => format!("Conversion rate changed from {} to {}", previous.rate, created.rate),
            None => format!("Conversion rate set to {}", created.rate),
        };
        activity::record_audit(&self.database, actor, "Rate changed", "Conversion rate", description).await?;

        Ok(created)
    }

    async fn adjust_user_points(
        &self,
        actor: &Actor,
        user_id: i64,
        request: AdjustPointsRequest,
    ) -> AppResult<AdjustPointsResponse> {
        let (kind, points) = request.resolve();
        if points == 0 {
            return Err(AppError::BadRequest("Points must not be zero".to_string()));
        }
        let reason = request.reason.trim();

        let (user, transaction) = self
            .database
            .apply_points_change(adjustment_change(user_id, kind, points, reason))
            .await?;

        activity::record_audit(
            &self.database,
            actor,
            "Points adjusted",
            format!("User {}", user.id),
            format!(
                "{} {} points for {}: {}",
                transaction.kind,
                points,
                user.full_name(),
                reason
            ),
        )
        .await?;

        activity::notify(
            &self.database,
            NewNotification::new(
                user.id,
                NotificationType::Points,
                "Points Updated",
                adjustment_message(&transaction),
            ),
        )
        .await?;

        info!(
            "🎯 员工 {} 积分调整 {:?} {} -> 余额 {}",
            user.id, kind, points, user.points_balance
        );
        Ok(AdjustPointsResponse { user, transaction })
    }

    async fn history(&self, query: PointsHistoryQuery) -> AppResult<Vec<PointTransaction>> {
        self.database.find_transactions(&query.to_query()).await
    }

    async fn transactions(&self, query: TransactionListQuery) -> AppResult<PageData<PointTransaction>> {
        debug!("🔍 积分流水查询: {:?}", query);

        let transactions = self.database.find_transactions(&query.to_query()).await?;
        Ok(PageData::paginate(&transactions, query.pagination()))
    }

    async fn schedule_rate(&self, actor: &Actor, request: ScheduleRateRequest) -> AppResult<ConversionRate> {
        let scheduled = self
            .database
            .schedule_rate(request.rate, request.effective_date, &actor.user.subject)
            .await?;

        activity::record_audit(
            &self.database,
            actor,
            "Rate scheduled",
            "Conversion rate",
            format!(
                "Rate {} scheduled from {}",
                scheduled.rate,
                scheduled.effective_from.to_rfc3339()
            ),
        )
        .await?;

        Ok(scheduled)
    }

    async fn delete_scheduled_rate(&self, actor: &Actor, id: i64) -> AppResult<ConversionRate> {
        let deleted = self.database.delete_scheduled_rate(id, Utc::now()).await?;

        activity::record_audit(
            &self.database,
            actor,
            "Scheduled rate deleted",
            "Conversion rate",
            format!(
                "Removed rate {} scheduled for {}",
                deleted.rate,
                deleted.effective_from.to_rfc3339()
            ),
        )
        .await?;

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::admin_actor;
    use chrono::Duration;
    use database::{
        notification::repository::NotificationRepositoryTrait, rate::model::RateStatus,
        staff::repository::StaffRepositoryTrait,
    };

    async fn service() -> (PointsService, Arc<Database>) {
        let database = Arc::new(Database::new_for_test().await);
        (PointsService::new(database.clone()), database)
    }

    fn adjust(points: i64, kind: Option<AdjustmentKind>) -> AdjustPointsRequest {
        AdjustPointsRequest {
            points,
            reason: "Quarterly recognition".to_string(),
            kind,
        }
    }

    #[tokio::test]
    async fn test_config_reports_current_rate() {
        let (service, _) = service().await;
        let config = service.config().await.unwrap();

        assert_eq!(config.current_rate, Decimal::from(10));
        assert_eq!(config.currency, "NGN");
        assert_eq!(config.rate_history.len(), 2);
        assert_eq!(config.rate_history[0].status, RateStatus::Active);
        assert_eq!(config.rate_history[1].status, RateStatus::Expired);
    }

    #[tokio::test]
    async fn test_update_rate_replaces_active() {
        let (service, _) = service().await;
        let actor = admin_actor("admin-1");

        service.update_rate(&actor, Decimal::from(12)).await.unwrap();
        let config = service.config().await.unwrap();
        assert_eq!(config.current_rate, Decimal::from(12));
        assert_eq!(
            config
                .rate_history
                .iter()
                .filter(|r| r.status == RateStatus::Active)
                .count(),
            1
        );

        assert!(service.update_rate(&actor, Decimal::ZERO).await.is_err());
    }

    #[tokio::test]
    async fn test_adjust_add_and_remove() {
        let (service, database) = service().await;
        let actor = admin_actor("admin-1");
        let before = database.get_staff(3).await.unwrap();

        let added = service.adjust_user_points(&actor, 3, adjust(250, None)).await.unwrap();
        assert_eq!(added.transaction.kind, TransactionType::Bonus);
        assert_eq!(added.user.points_balance, before.points_balance + 250);
        assert_eq!(added.transaction.balance, added.user.points_balance);

        let removed = service.adjust_user_points(&actor, 3, adjust(-100, None)).await.unwrap();
        assert_eq!(removed.transaction.kind, TransactionType::Deduction);
        assert_eq!(removed.transaction.amount, -100);

        let notifications = database.find_notifications(3).await.unwrap();
        assert_eq!(notifications[0].title, "Points Updated");
    }

    #[tokio::test]
    async fn test_freeze_unfreeze_and_expire() {
        let (service, _) = service().await;
        let actor = admin_actor("admin-1");

        let frozen = service
            .adjust_user_points(&actor, 1, adjust(100, Some(AdjustmentKind::Freeze)))
            .await
            .unwrap();
        assert_eq!(frozen.transaction.amount, 0);
        assert_eq!(frozen.transaction.frozen_amount, 100);

        let unfrozen = service
            .adjust_user_points(&actor, 1, adjust(100, Some(AdjustmentKind::Unfreeze)))
            .await
            .unwrap();
        assert_eq!(unfrozen.user.frozen_points, frozen.user.frozen_points - 100);

        // 超出冻结额的解冻被拒绝
        let err = service
            .adjust_user_points(&actor, 1, adjust(i64::from(i32::MAX), Some(AdjustmentKind::Unfreeze)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        // 过期积分截断到可用余额
        let available = unfrozen.user.available_points();
        let expired = service
            .adjust_user_points(&actor, 1, adjust(available + 10_000, Some(AdjustmentKind::Expire)))
            .await
            .unwrap();
        assert_eq!(expired.transaction.amount, -available);
        assert_eq!(expired.user.available_points(), 0);
    }

    #[tokio::test]
    async fn test_schedule_and_delete_rate() {
        let (service, _) = service().await;
        let actor = admin_actor("admin-1");

        let past = ScheduleRateRequest {
            rate: Decimal::from(11),
            effective_date: Utc::now() - Duration::days(1),
        };
        assert!(service.schedule_rate(&actor, past).await.is_err());

        let scheduled = service
            .schedule_rate(
                &actor,
                ScheduleRateRequest {
                    rate: Decimal::from(11),
                    effective_date: Utc::now() + Duration::days(7),
                },
            )
            .await
            .unwrap();
        assert_eq!(service.config().await.unwrap().current_rate, Decimal::from(10));

        service.delete_scheduled_rate(&actor, scheduled.id).await.unwrap();
        // 生效中的汇率不能删除
        assert!(service.delete_scheduled_rate(&actor, 2).await.is_err());
    }

    #[tokio::test]
    async fn test_transactions_paginate() {
        let (service, _) = service().await;
        let page = service
            .transactions(serde_urlencoded::from_str("user_id=1&limit=5").unwrap())
            .await
            .unwrap();
        assert!(page.items.len() <= 5);
        assert!(page.items.iter().all(|tx| tx.user_id == 1));

        let history = service
            .history(PointsHistoryQuery {
                user_id: Some(1),
                kind: Some(TransactionType::Earned),
            })
            .await
            .unwrap();
        assert!(history.iter().all(|tx| tx.kind == TransactionType::Earned));
    }
}
