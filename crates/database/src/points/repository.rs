use crate::{
    points::{
        ledger,
        model::{PointTransaction, PointsChange, TransactionQuery},
    },
    staff::model::StaffUser,
    Database,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use utils::{AppError, AppResult};

pub type DynPointsRepository = Arc<dyn PointsRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait PointsRepositoryTrait {
    /// 原子地修改员工积分并写入流水
    async fn apply_points_change(&self, change: PointsChange) -> AppResult<(StaffUser, PointTransaction)>;

    /// 按创建时间倒序
    async fn find_transactions(&self, query: &TransactionQuery) -> AppResult<Vec<PointTransaction>>;
}

#[async_trait]
impl PointsRepositoryTrait for Database {
    async fn apply_points_change(&self, change: PointsChange) -> AppResult<(StaffUser, PointTransaction)> {
        let mut staff = self.staff_users.write().await;
        let mut transactions = self.point_transactions.write().await;

        let user = staff
            .iter_mut()
            .find(|u| u.id == change.user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let transaction = ledger::apply_change(user, &mut transactions, self.point_transactions.next_id(), change)?;

        info!(
            "💰 积分变动 user={} type={} amount={} frozen={} balance={}",
            transaction.user_id, transaction.kind, transaction.amount, transaction.frozen_amount, transaction.balance
        );
        Ok((user.clone(), transaction))
    }

    async fn find_transactions(&self, query: &TransactionQuery) -> AppResult<Vec<PointTransaction>> {
        let transactions = self.point_transactions.read().await;

        let mut filtered: Vec<PointTransaction> = transactions.iter().filter(|t| query.matches(t)).cloned().collect();
        filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{points::model::TransactionType, staff::repository::StaffRepositoryTrait};

    #[tokio::test]
    async fn test_apply_change_updates_staff_and_history() {
        let db = Database::new_for_test().await;
        let before = db.get_staff(3).await.unwrap();

        let (user, tx) = db
            .apply_points_change(PointsChange::new(3, TransactionType::Bonus, 250, "Quarterly bonus"))
            .await
            .unwrap();

        assert_eq!(user.points_balance, before.points_balance + 250);
        assert_eq!(tx.balance, user.points_balance);

        let history = db.find_transactions(&TransactionQuery::for_user(3)).await.unwrap();
        assert_eq!(history[0].id, tx.id);
        assert!(history.iter().all(|t| t.user_id == 3));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let db = Database::new_for_test().await;
        let result = db
            .apply_points_change(PointsChange::new(9999, TransactionType::Bonus, 1, "x"))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_filter_by_type() {
        let db = Database::new_for_test().await;
        let query = TransactionQuery {
            kind: Some(TransactionType::Earned),
            ..Default::default()
        };

        let earned = db.find_transactions(&query).await.unwrap();
        assert!(!earned.is_empty());
        assert!(earned.iter().all(|t| t.kind == TransactionType::Earned));
        assert!(earned.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
