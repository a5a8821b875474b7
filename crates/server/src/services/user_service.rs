use crate::{
    dtos::{
        common::PageData,
        user_dto::{UpdateUserRequest, UserDetail, UserListQuery},
    },
    extractors::Actor,
    services::activity,
};
use async_trait::async_trait;
use database::{
    points::{
        model::{PointTransaction, TransactionQuery},
        repository::PointsRepositoryTrait,
    },
    referral::{
        model::{Referral, ReferralQuery},
        repository::ReferralRepositoryTrait,
    },
    staff::{
        model::{StaffUpdate, StaffUser},
        repository::StaffRepositoryTrait,
    },
    withdrawal::{model::WithdrawalQuery, repository::WithdrawalRepositoryTrait},
    Database,
};
use std::sync::Arc;
use tracing::{debug, info};
use utils::{AppError, AppResult};

pub type DynUserService = Arc<dyn UserServiceTrait + Send + Sync>;

/// 管理后台的员工管理
#[async_trait]
pub trait UserServiceTrait {
    async fn list_users(&self, query: UserListQuery) -> AppResult<PageData<StaffUser>>;

    async fn get_user(&self, id: i64) -> AppResult<UserDetail>;

    async fn user_referrals(&self, id: i64) -> AppResult<Vec<Referral>>;

    async fn user_transactions(&self, id: i64) -> AppResult<Vec<PointTransaction>>;

    async fn update_user(&self, actor: &Actor, id: i64, request: UpdateUserRequest) -> AppResult<StaffUser>;

    async fn set_user_active(&self, actor: &Actor, id: i64, is_active: bool) -> AppResult<StaffUser>;

    /// 仍有未完结提现的员工不能删除
    async fn delete_user(&self, actor: &Actor, id: i64) -> AppResult<StaffUser>;
}

#[derive(Clone)]
pub struct UserService {
    database: Arc<Database>,
}

impl UserService {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    async fn open_withdrawals(&self, id: i64) -> AppResult<usize> {
        let withdrawals = self.database.find_withdrawals(&WithdrawalQuery::for_user(id)).await?;
        Ok(withdrawals.iter().filter(|w| w.status.is_open()).count())
    }
}

#[async_trait]
impl UserServiceTrait for UserService {
    async fn list_users(&self, query: UserListQuery) -> AppResult<PageData<StaffUser>> {
        debug!("🔍 员工列表查询: {:?}", query);

        let users = self.database.find_staff(&query.to_query()).await?;
        Ok(PageData::paginate(&users, query.pagination()))
    }

    async fn get_user(&self, id: i64) -> AppResult<UserDetail> {
        let user = self.database.get_staff(id).await?;
        let referral_stats = self.database.referral_stats(Some(id)).await?;
        let open_withdrawals = self.open_withdrawals(id).await?;

        Ok(UserDetail {
            available_points: user.available_points(),
            user,
            referral_stats,
            open_withdrawals,
        })
    }

    async fn user_referrals(&self, id: i64) -> AppResult<Vec<Referral>> {
        self.database.get_staff(id).await?;
        self.database.find_referrals(&ReferralQuery::for_user(id)).await
    }

    async fn user_transactions(&self, id: i64) -> AppResult<Vec<PointTransaction>> {
        self.database.get_staff(id).await?;
        self.database.find_transactions(&TransactionQuery::for_user(id)).await
    }

    async fn update_user(&self, actor: &Actor, id: i64, request: UpdateUserRequest) -> AppResult<StaffUser> {
        let update: StaffUpdate = request.into();
        if update.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }

        let user = self.database.update_staff(id, update).await?;
        activity::record_audit(
            &self.database,
            actor,
            "User updated",
            format!("User {}", user.id),
            format!("Updated profile of {}", user.full_name()),
        )
        .await?;

        info!("✏️ 员工 {} 资料已更新", user.id);
        Ok(user)
    }

    async fn set_user_active(&self, actor: &Actor, id: i64, is_active: bool) -> AppResult<StaffUser> {
        let user = self.database.set_staff_active(id, is_active).await?;

        let action = if is_active { "User activated" } else { "User deactivated" };
        activity::record_audit(
            &self.database,
            actor,
            action,
            format!("User {}", user.id),
            format!("{}: {}", action, user.full_name()),
        )
        .await?;

        info!("👤 员工 {} is_active={}", user.id, is_active);
        Ok(user)
    }

    async fn delete_user(&self, actor: &Actor, id: i64) -> AppResult<StaffUser> {
        let user = self.database.delete_staff(id).await?;
        activity::record_audit(
            &self.database,
            actor,
            "User deleted",
            format!("User {}", user.id),
            format!("Deleted {} ({})", user.full_name(), user.email),
        )
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::admin_actor;
    use database::{
        audit::model::AuditQuery, audit::repository::AuditRepositoryTrait, withdrawal::model::NewWithdrawal,
    };
    use rust_decimal::Decimal;

    async fn service() -> (UserService, Arc<Database>) {
        let database = Arc::new(Database::new_for_test().await);
        (UserService::new(database.clone()), database)
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let (service, _) = service().await;

        let page = service
            .list_users(serde_urlencoded::from_str("department=IT&status=active&limit=5").unwrap())
            .await
            .unwrap();
        assert_eq!(page.meta.total, 7);
        assert_eq!(page.meta.total_pages, 2);
        assert_eq!(page.items.len(), 5);
        assert!(page.items.iter().all(|u| u.department == "IT" && u.is_active));

        let page = service
            .list_users(serde_urlencoded::from_str("search=refax9k01").unwrap())
            .await
            .unwrap();
        assert_eq!(page.items[0].first_name, "Adewale");
    }

    #[tokio::test]
    async fn test_deactivate_writes_audit() {
        let (service, database) = service().await;
        let actor = admin_actor("admin-2");

        let user = service.set_user_active(&actor, 1, false).await.unwrap();
        assert!(!user.is_active);

        let logs = database
            .find_audit_logs(&AuditQuery {
                admin_id: Some("admin-2".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(logs[0].action, "User deactivated");
        assert_eq!(logs[0].admin_name, "Manager User");
        assert_eq!(logs[0].target, "User 1");
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let (service, _) = service().await;
        let err = service
            .update_user(&admin_actor("admin-1"), 1, UpdateUserRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No fields to update");
    }

    #[tokio::test]
    async fn test_user_lookups_require_existing_user() {
        let (service, _) = service().await;

        assert!(matches!(service.get_user(999).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.user_referrals(999).await, Err(AppError::NotFound(_))));

        let referrals = service.user_referrals(1).await.unwrap();
        assert_eq!(referrals.len(), 18);
        assert!(referrals.iter().all(|r| r.user_id == 1));
    }

    #[tokio::test]
    async fn test_delete_user_without_open_withdrawals() {
        let (service, database) = service().await;
        let actor = admin_actor("admin-1");

        // 找一个没有未完结提现的员工
        let mut candidate = None;
        for id in 1..=50 {
            if service.open_withdrawals(id).await.unwrap() == 0 {
                candidate = Some(id);
                break;
            }
        }
        let id = candidate.unwrap();

        service.delete_user(&actor, id).await.unwrap();
        assert!(database.get_staff(id).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_user_with_open_withdrawal_is_conflict() {
        let (service, database) = service().await;
        let actor = admin_actor("admin-1");

        let mut candidate = None;
        for id in 1..=50 {
            if service.open_withdrawals(id).await.unwrap() > 0 {
                candidate = Some(id);
                break;
            }
        }
        let id = candidate.unwrap();

        assert!(matches!(service.delete_user(&actor, id).await, Err(AppError::Conflict(_))));
        assert!(database.get_staff(id).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_delete_racing_withdrawal_never_orphans_it() {
        for _ in 0..20 {
            let (service, database) = service().await;
            let actor = admin_actor("admin-1");

            let mut candidate = None;
            for id in 1..=50 {
                let user = database.get_staff(id).await.unwrap();
                if user.points_balance > 0 && service.open_withdrawals(id).await.unwrap() == 0 {
                    candidate = Some(id);
                    break;
                }
            }
            let id = candidate.unwrap();

            let create = {
                let database = database.clone();
                tokio::spawn(async move {
                    database
                        .create_withdrawal(NewWithdrawal {
                            user_id: id,
                            points: 1,
                            conversion_rate: Decimal::from(10),
                            amount: Decimal::new(1, 1),
                            currency: "NGN".to_string(),
                            bank_name: "GTBank".to_string(),
                            account_number: "0123456789".to_string(),
                            account_name: "Race Test".to_string(),
                        })
                        .await
                })
            };
            let deleted = service.delete_user(&actor, id).await;
            let created = create.await.unwrap();

            // 两者不能同时成功
            assert!(deleted.is_err() || created.is_err());
            if created.is_ok() {
                assert!(matches!(deleted, Err(AppError::Conflict(_))));
            }
        }
    }
}
