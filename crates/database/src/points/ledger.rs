//! 积分记账：调用方持有 staff 与 transactions 的写锁后调用

use chrono::Utc;
use utils::{AppError, AppResult};

use crate::{
    points::model::{PointTransaction, PointsChange},
    staff::model::StaffUser,
};

/// 校验并应用一次积分变动，返回写入的流水
///
/// 约束：0 <= frozen_points <= points_balance
pub(crate) fn apply_change(
    user: &mut StaffUser,
    transactions: &mut Vec<PointTransaction>,
    transaction_id: i64,
    mut change: PointsChange,
) -> AppResult<PointTransaction> {
    if change.clamp_at_zero && change.amount < 0 {
        change.amount = change.amount.max(-user.available_points());
    }

    let balance = user.points_balance + change.amount;
    let frozen = user.frozen_points + change.frozen_amount;

    if frozen < 0 {
        return Err(AppError::BadRequest(format!(
            "Only {} points are frozen",
            user.frozen_points
        )));
    }
    if balance < frozen || balance < 0 {
        return Err(AppError::BadRequest(format!(
            "Insufficient points balance: {} available",
            user.available_points()
        )));
    }

    let now = Utc::now();
    user.points_balance = balance;
    user.frozen_points = frozen;
    user.updated_at = now;

    let transaction = PointTransaction {
        id: transaction_id,
        user_id: user.id,
        user_name: user.full_name(),
        kind: change.kind,
        amount: change.amount,
        frozen_amount: change.frozen_amount,
        balance,
        description: change.description,
        referral_id: change.referral_id,
        withdrawal_id: change.withdrawal_id,
        created_at: now,
    };
    transactions.insert(0, transaction.clone());

    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{points::model::TransactionType, staff::model::StaffHours};
    use chrono::NaiveDate;

    fn staff(balance: i64, frozen: i64) -> StaffUser {
        StaffUser {
            id: 7,
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            email: "ada@company.com".to_string(),
            phone: String::new(),
            password_hash: String::new(),
            referral_code: "REFTEST01".to_string(),
            department: "IT".to_string(),
            position: "Junior".to_string(),
            location: "Lagos".to_string(),
            join_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            is_active: true,
            points_balance: balance,
            frozen_points: frozen,
            total_referrals: 0,
            successful_referrals: 0,
            avatar: String::new(),
            hours: StaffHours::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_credit_records_snapshot() {
        let mut user = staff(100, 0);
        let mut txs = Vec::new();

        let tx = apply_change(&mut user, &mut txs, 1, PointsChange::new(7, TransactionType::Bonus, 50, "bonus"))
            .unwrap();

        assert_eq!(user.points_balance, 150);
        assert_eq!(tx.balance, 150);
        assert_eq!(tx.user_name, "Ada Obi");
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn test_debit_cannot_touch_frozen_points() {
        let mut user = staff(100, 80);
        let mut txs = Vec::new();

        let result = apply_change(
            &mut user,
            &mut txs,
            1,
            PointsChange::new(7, TransactionType::Deduction, -30, "too much"),
        );

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(user.points_balance, 100);
        assert!(txs.is_empty());
    }

    #[test]
    fn test_clamped_expiry_stops_at_available() {
        let mut user = staff(100, 40);
        let mut txs = Vec::new();

        let tx = apply_change(
            &mut user,
            &mut txs,
            1,
            PointsChange::new(7, TransactionType::Expired, -500, "expire").clamped(),
        )
        .unwrap();

        assert_eq!(tx.amount, -60);
        assert_eq!(user.points_balance, 40);
        assert_eq!(user.available_points(), 0);
    }

    #[test]
    fn test_freeze_and_unfreeze() {
        let mut user = staff(100, 0);
        let mut txs = Vec::new();

        apply_change(&mut user, &mut txs, 1, PointsChange::new(7, TransactionType::Frozen, 0, "freeze").frozen(70))
            .unwrap();
        assert_eq!(user.available_points(), 30);

        let over = apply_change(
            &mut user,
            &mut txs,
            2,
            PointsChange::new(7, TransactionType::Unfrozen, 0, "unfreeze").frozen(-80),
        );
        assert!(over.is_err());

        apply_change(
            &mut user,
            &mut txs,
            3,
            PointsChange::new(7, TransactionType::Unfrozen, 0, "unfreeze").frozen(-70),
        )
        .unwrap();
        assert_eq!(user.frozen_points, 0);
        assert_eq!(txs[0].id, 3);
    }
}
