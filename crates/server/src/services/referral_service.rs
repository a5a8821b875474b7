use crate::{
    dtos::{
        common::PageData,
        referral_dto::{ReferralListQuery, UpdateReferralStatusRequest},
    },
    extractors::Actor,
    services::activity,
};
use async_trait::async_trait;
use database::{
    notification::model::{NewNotification, NotificationType},
    referral::{
        model::{Referral, ReferralStats, ReferralStatus, ReferralTransition},
        repository::ReferralRepositoryTrait,
    },
    Database,
};
use std::sync::Arc;
use tracing::{debug, info};
use utils::AppResult;

pub type DynReferralService = Arc<dyn ReferralServiceTrait + Send + Sync>;

/// 管理后台的推荐审核
#[async_trait]
pub trait ReferralServiceTrait {
    async fn list_referrals(&self, query: ReferralListQuery) -> AppResult<PageData<Referral>>;

    async fn get_referral(&self, id: i64) -> AppResult<Referral>;

    /// 完成时给推荐人发放积分并通知
    async fn update_status(
        &self,
        actor: &Actor,
        id: i64,
        request: UpdateReferralStatusRequest,
    ) -> AppResult<Referral>;

    async fn referral_stats(&self) -> AppResult<ReferralStats>;
}

#[derive(Clone)]
pub struct ReferralService {
    database: Arc<Database>,
    referral_points: i64,
}

impl ReferralService {
    pub fn new(database: Arc<Database>, referral_points: i64) -> Self {
        Self {
            database,
            referral_points,
        }
    }

    fn status_notification(&self, referral: &Referral) -> Option<NewNotification> {
        let (title, message) = match referral.status {
            ReferralStatus::Approved => (
                "Referral Approved",
                format!("Your referral of {} has been approved", referral.referee_name),
            ),
            ReferralStatus::Completed => (
                "Referral Completed",
                format!(
                    "Your referral of {} is complete. You earned {} points!",
                    referral.referee_name, referral.points_awarded
                ),
            ),
            ReferralStatus::Rejected => (
                "Referral Rejected",
                format!("Your referral of {} was not accepted", referral.referee_name),
            ),
            ReferralStatus::Pending => return None,
        };

        Some(NewNotification::new(
            referral.user_id,
            NotificationType::Referral,
            title,
            message,
        ))
    }
}

#[async_trait]
impl ReferralServiceTrait for ReferralService {
    async fn list_referrals(&self, query: ReferralListQuery) -> AppResult<PageData<Referral>> {
        debug!("🔍 推荐列表查询: {:?}", query);

        let referrals = self.database.find_referrals(&query.to_query()).await?;
        Ok(PageData::paginate(&referrals, query.pagination()))
    }

    async fn get_referral(&self, id: i64) -> AppResult<Referral> {
        self.database.get_referral(id).await
    }

    async fn update_status(
        &self,
        actor: &Actor,
        id: i64,
        request: UpdateReferralStatusRequest,
    ) -> AppResult<Referral> {
        let (referral, awarded) = self
            .database
            .transition_referral(
                id,
                ReferralTransition {
                    status: request.status,
                    notes: request.notes,
                    reward_points: self.referral_points,
                },
            )
            .await?;

        let description = match &awarded {
            Some(tx) => format!(
                "Referral of {} marked {}; {} points awarded to {}",
                referral.referee_name, referral.status, tx.amount, referral.referrer_name
            ),
            None => format!("Referral of {} marked {}", referral.referee_name, referral.status),
        };
        activity::record_audit(
            &self.database,
            actor,
            &format!("Referral {}", referral.status),
            format!("Referral {}", referral.id),
            description,
        )
        .await?;

        if let Some(notification) = self.status_notification(&referral) {
            activity::notify(&self.database, notification).await?;
        }

        info!("📋 推荐 {} -> {}", referral.id, referral.status);
        Ok(referral)
    }

    async fn referral_stats(&self) -> AppResult<ReferralStats> {
        self.database.referral_stats(None).await
    }
}
