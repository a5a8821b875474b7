use crate::{
    points::{
        ledger,
        model::{PointTransaction, PointsChange, TransactionType},
    },
    withdrawal::model::{NewWithdrawal, Withdrawal, WithdrawalQuery, WithdrawalStatus, WithdrawalTransition},
    Database,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use utils::{AppError, AppResult};

pub type DynWithdrawalRepository = Arc<dyn WithdrawalRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait WithdrawalRepositoryTrait {
    /// 按创建时间倒序
    async fn find_withdrawals(&self, query: &WithdrawalQuery) -> AppResult<Vec<Withdrawal>>;

    async fn get_withdrawal(&self, id: i64) -> AppResult<Withdrawal>;

    /// 写入申请并预留积分（withdrawal 流水）
    async fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> AppResult<(Withdrawal, PointTransaction)>;

    /// 状态变更；拒绝时退回预留积分
    async fn transition_withdrawal(
        &self,
        id: i64,
        transition: WithdrawalTransition,
    ) -> AppResult<(Withdrawal, Option<PointTransaction>)>;

    /// 仅 pending 可取消：删除申请并退回积分
    async fn cancel_withdrawal(&self, user_id: i64, id: i64) -> AppResult<(Withdrawal, PointTransaction)>;
}

fn withdrawal_not_found() -> AppError {
    AppError::NotFound("Withdrawal not found".to_string())
}

#[async_trait]
impl WithdrawalRepositoryTrait for Database {
    async fn find_withdrawals(&self, query: &WithdrawalQuery) -> AppResult<Vec<Withdrawal>> {
        let withdrawals = self.withdrawals.read().await;

        let mut filtered: Vec<Withdrawal> = withdrawals.iter().filter(|w| query.matches(w)).cloned().collect();
        filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(filtered)
    }

    async fn get_withdrawal(&self, id: i64) -> AppResult<Withdrawal> {
        let withdrawals = self.withdrawals.read().await;
        withdrawals.iter().find(|w| w.id == id).cloned().ok_or_else(withdrawal_not_found)
    }

    async fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> AppResult<(Withdrawal, PointTransaction)> {
        let mut staff = self.staff_users.write().await;
        let mut withdrawals = self.withdrawals.write().await;
        let mut transactions = self.point_transactions.write().await;

        let user = staff
            .iter_mut()
            .find(|u| u.id == withdrawal.user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let id = self.withdrawals.next_id();
        let change = PointsChange::new(
            user.id,
            TransactionType::Withdrawal,
            -withdrawal.points,
            format!("Withdrawal request of {} {}", withdrawal.amount, withdrawal.currency),
        )
        .for_withdrawal(id);
        let reserved = ledger::apply_change(user, &mut transactions, self.point_transactions.next_id(), change)?;

        let created = Withdrawal {
            id,
            user_id: user.id,
            user_name: user.full_name(),
            points: withdrawal.points,
            conversion_rate: withdrawal.conversion_rate,
            amount: withdrawal.amount,
            currency: withdrawal.currency,
            status: WithdrawalStatus::Pending,
            bank_name: withdrawal.bank_name,
            account_number: withdrawal.account_number,
            account_name: withdrawal.account_name,
            created_at: Utc::now(),
            processed_at: None,
            processed_by: None,
            rejection_reason: None,
        };
        withdrawals.push(created.clone());

        info!(
            "🏧 新提现申请 {} user={} points={} amount={} {}",
            created.id, created.user_id, created.points, created.amount, created.currency
        );
        Ok((created, reserved))
    }

    async fn transition_withdrawal(
        &self,
        id: i64,
        transition: WithdrawalTransition,
    ) -> AppResult<(Withdrawal, Option<PointTransaction>)> {
        let mut staff = self.staff_users.write().await;
        let mut withdrawals = self.withdrawals.write().await;
        let mut transactions = self.point_transactions.write().await;

        let withdrawal = withdrawals.iter_mut().find(|w| w.id == id).ok_or_else(withdrawal_not_found)?;
        let current = withdrawal.status;
        let next = transition.status;

        if current == next {
            return Err(AppError::BadRequest(format!("Withdrawal is already {}", current)));
        }
        if transition.force {
            if current == WithdrawalStatus::Paid {
                return Err(AppError::BadRequest("Paid withdrawals cannot be changed".to_string()));
            }
        } else if !current.can_transition_to(next) {
            return Err(AppError::BadRequest(format!(
                "Cannot change withdrawal status from {} to {}",
                current, next
            )));
        }

        // 预留积分随状态进出 rejected 而退回/重新扣减
        let points_change = match (current, next) {
            (c, WithdrawalStatus::Rejected) if c.is_open() => Some(
                PointsChange::new(
                    withdrawal.user_id,
                    TransactionType::Refund,
                    withdrawal.points,
                    format!("Refund for rejected withdrawal #{}", withdrawal.id),
                )
                .for_withdrawal(withdrawal.id),
            ),
            (WithdrawalStatus::Rejected, _) => Some(
                PointsChange::new(
                    withdrawal.user_id,
                    TransactionType::Withdrawal,
                    -withdrawal.points,
                    format!("Withdrawal #{} reinstated", withdrawal.id),
                )
                .for_withdrawal(withdrawal.id),
            ),
            _ => None,
        };

        let transaction = match points_change {
            Some(change) => {
                let user = staff
                    .iter_mut()
                    .find(|u| u.id == withdrawal.user_id)
                    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
                Some(ledger::apply_change(
                    user,
                    &mut transactions,
                    self.point_transactions.next_id(),
                    change,
                )?)
            }
            None => None,
        };

        withdrawal.status = next;
        withdrawal.processed_at = Some(Utc::now());
        withdrawal.processed_by = Some(transition.processed_by);
        withdrawal.rejection_reason = match next {
            WithdrawalStatus::Rejected => transition.rejection_reason,
            _ => None,
        };

        info!("🔄 提现 {} 状态 {} -> {}", withdrawal.id, current, next);
        Ok((withdrawal.clone(), transaction))
    }

    async fn cancel_withdrawal(&self, user_id: i64, id: i64) -> AppResult<(Withdrawal, PointTransaction)> {
        let mut staff = self.staff_users.write().await;
        let mut withdrawals = self.withdrawals.write().await;
        let mut transactions = self.point_transactions.write().await;

        let index = withdrawals
            .iter()
            .position(|w| w.id == id && w.user_id == user_id)
            .ok_or_else(withdrawal_not_found)?;

        if withdrawals[index].status != WithdrawalStatus::Pending {
            return Err(AppError::BadRequest(
                "Only pending withdrawals can be cancelled".to_string(),
            ));
        }

        let user = staff
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let change = PointsChange::new(
            user_id,
            TransactionType::Refund,
            withdrawals[index].points,
            format!("Refund for cancelled withdrawal #{}", id),
        )
        .for_withdrawal(id);
        let refund = ledger::apply_change(user, &mut transactions, self.point_transactions.next_id(), change)?;

        let cancelled = withdrawals.remove(index);
        info!("↩️ 员工 {} 取消提现 {}", user_id, id);

        Ok((cancelled, refund))
    }
}
