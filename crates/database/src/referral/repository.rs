use crate::{
    points::{
        ledger,
        model::{PointTransaction, PointsChange, TransactionType},
    },
    referral::model::{NewReferral, Referral, ReferralQuery, ReferralStats, ReferralStatus, ReferralTransition},
    Database,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use utils::{AppError, AppResult};

pub type DynReferralRepository = Arc<dyn ReferralRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait ReferralRepositoryTrait {
    /// 按创建时间倒序
    async fn find_referrals(&self, query: &ReferralQuery) -> AppResult<Vec<Referral>>;

    async fn get_referral(&self, id: i64) -> AppResult<Referral>;

    /// 同一邮箱只能存在一条 pending 推荐
    async fn create_referral(&self, referral: NewReferral) -> AppResult<Referral>;

    /// 状态变更；完成时给推荐人记一笔 earned 流水
    async fn transition_referral(
        &self,
        id: i64,
        transition: ReferralTransition,
    ) -> AppResult<(Referral, Option<PointTransaction>)>;

    async fn referral_stats(&self, user_id: Option<i64>) -> AppResult<ReferralStats>;
}

fn referral_not_found() -> AppError {
    AppError::NotFound("Referral not found".to_string())
}

#[async_trait]
impl ReferralRepositoryTrait for Database {
    async fn find_referrals(&self, query: &ReferralQuery) -> AppResult<Vec<Referral>> {
        let referrals = self.referrals.read().await;

        let mut filtered: Vec<Referral> = referrals.iter().filter(|r| query.matches(r)).cloned().collect();
        filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(filtered)
    }

    async fn get_referral(&self, id: i64) -> AppResult<Referral> {
        let referrals = self.referrals.read().await;
        referrals.iter().find(|r| r.id == id).cloned().ok_or_else(referral_not_found)
    }

    async fn create_referral(&self, referral: NewReferral) -> AppResult<Referral> {
        let mut staff = self.staff_users.write().await;
        let mut referrals = self.referrals.write().await;

        let referrer = staff
            .iter_mut()
            .find(|u| u.id == referral.user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let duplicate = referrals.iter().any(|r| {
            r.status == ReferralStatus::Pending && r.referee_email.eq_ignore_ascii_case(&referral.referee_email)
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "A pending referral for {} already exists",
                referral.referee_email
            )));
        }

        let now = Utc::now();
        let created = Referral {
            id: self.referrals.next_id(),
            user_id: referrer.id,
            referrer_name: referrer.full_name(),
            referrer_code: referrer.referral_code.clone(),
            referee_name: referral.referee_name,
            referee_email: referral.referee_email.to_lowercase(),
            referee_phone: referral.referee_phone,
            status: ReferralStatus::Pending,
            points_awarded: 0,
            notes: referral.notes,
            created_at: now,
            updated_at: now,
        };

        referrer.total_referrals += 1;
        referrer.updated_at = now;
        referrals.push(created.clone());

        info!("📨 新推荐 {} -> {}", created.referrer_code, created.referee_email);
        Ok(created)
    }

    async fn transition_referral(
        &self,
        id: i64,
        transition: ReferralTransition,
    ) -> AppResult<(Referral, Option<PointTransaction>)> {
        let mut staff = self.staff_users.write().await;
        let mut referrals = self.referrals.write().await;
        let mut transactions = self.point_transactions.write().await;

        let referral = referrals.iter_mut().find(|r| r.id == id).ok_or_else(referral_not_found)?;

        if !referral.status.can_transition_to(transition.status) {
            return Err(AppError::BadRequest(format!(
                "Cannot change referral status from {} to {}",
                referral.status, transition.status
            )));
        }

        let mut awarded = None;
        if transition.status == ReferralStatus::Completed {
            let referrer = staff
                .iter_mut()
                .find(|u| u.id == referral.user_id)
                .ok_or_else(|| AppError::NotFound("Referrer not found".to_string()))?;

            let change = PointsChange::new(
                referrer.id,
                TransactionType::Earned,
                transition.reward_points,
                format!("Points earned from successful referral of {}", referral.referee_name),
            )
            .for_referral(referral.id);

            let tx = ledger::apply_change(referrer, &mut transactions, self.point_transactions.next_id(), change)?;
            referrer.successful_referrals += 1;

            referral.points_awarded = transition.reward_points;
            awarded = Some(tx);
        }

        referral.status = transition.status;
        if let Some(notes) = transition.notes {
            referral.notes = notes;
        }
        referral.updated_at = Utc::now();

        info!("🔄 推荐 {} 状态变更为 {}", referral.id, referral.status);
        Ok((referral.clone(), awarded))
    }

    async fn referral_stats(&self, user_id: Option<i64>) -> AppResult<ReferralStats> {
        let referrals = self.referrals.read().await;
        let stats = ReferralStats::from_referrals(
            referrals
                .iter()
                .filter(|r| user_id.map_or(true, |id| r.user_id == id)),
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staff::repository::StaffRepositoryTrait;

    async fn first_with_status(db: &Database, status: ReferralStatus) -> Referral {
        db.find_referrals(&ReferralQuery {
            status: Some(status),
            ..Default::default()
        })
        .await
        .unwrap()
        .into_iter()
        .next()
        .unwrap()
    }

    fn to(status: ReferralStatus) -> ReferralTransition {
        ReferralTransition {
            status,
            notes: None,
            reward_points: 500,
        }
    }

    #[tokio::test]
    async fn test_completing_awards_points_once() {
        let db = Database::new_for_test().await;
        let referral = first_with_status(&db, ReferralStatus::Approved).await;
        let before = db.get_staff(referral.user_id).await.unwrap();

        let (completed, tx) = db
            .transition_referral(referral.id, to(ReferralStatus::Completed))
            .await
            .unwrap();

        let after = db.get_staff(referral.user_id).await.unwrap();
        assert_eq!(completed.points_awarded, 500);
        assert_eq!(tx.unwrap().referral_id, Some(referral.id));
        assert_eq!(after.points_balance, before.points_balance + 500);
        assert_eq!(after.successful_referrals, before.successful_referrals + 1);

        let again = db.transition_referral(referral.id, to(ReferralStatus::Completed)).await;
        assert!(matches!(again, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_pending_cannot_jump_to_completed() {
        let db = Database::new_for_test().await;
        let referral = first_with_status(&db, ReferralStatus::Pending).await;

        let result = db.transition_referral(referral.id, to(ReferralStatus::Completed)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let (approved, tx) = db
            .transition_referral(referral.id, to(ReferralStatus::Approved))
            .await
            .unwrap();
        assert_eq!(approved.status, ReferralStatus::Approved);
        assert!(tx.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_pending_email() {
        let db = Database::new_for_test().await;
        let before = db.get_staff(1).await.unwrap();

        let invite = NewReferral {
            user_id: 1,
            referee_name: "New Hire".to_string(),
            referee_email: "new.hire@example.com".to_string(),
            referee_phone: String::new(),
            notes: String::new(),
        };

        let created = db.create_referral(invite.clone()).await.unwrap();
        assert_eq!(created.status, ReferralStatus::Pending);
        assert_eq!(created.referrer_code, before.referral_code);
        assert_eq!(db.get_staff(1).await.unwrap().total_referrals, before.total_referrals + 1);

        let duplicate = db
            .create_referral(NewReferral {
                user_id: 2,
                referee_email: "NEW.HIRE@example.com".to_string(),
                ..invite
            })
            .await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_stats_match_listing() {
        let db = Database::new_for_test().await;
        let stats = db.referral_stats(Some(1)).await.unwrap();
        let listed = db.find_referrals(&ReferralQuery::for_user(1)).await.unwrap();

        assert_eq!(stats.total, listed.len() as u64);
        assert_eq!(stats.pending + stats.approved + stats.completed + stats.rejected, stats.total);
    }
}
