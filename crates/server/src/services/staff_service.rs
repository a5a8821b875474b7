use crate::{
    dtos::{
        auth_dto::StaffSummary,
        referral_dto::{SendInviteRequest, StaffReferralQuery},
        staff_dto::{ConversionRateInfo, PointsBalance, ReferralCodeResponse, StaffDashboard, StaffStats},
        withdrawal_dto::{CreateWithdrawalRequest, StaffWithdrawalQuery, WithdrawalLimits},
    },
    services::activity,
};
use async_trait::async_trait;
use chrono::Utc;
use database::{
    notification::model::{NewNotification, NotificationType},
    points::{
        model::{PointTransaction, TransactionQuery, TransactionType},
        repository::PointsRepositoryTrait,
    },
    rate::repository::RateRepositoryTrait,
    referral::{
        model::{NewReferral, Referral, ReferralQuery, ReferralStats, ReferralStatus},
        repository::ReferralRepositoryTrait,
    },
    settings::{model::SystemSettings, repository::SettingsRepositoryTrait},
    staff::{model::StaffUser, repository::StaffRepositoryTrait},
    withdrawal::{
        model::{NewWithdrawal, Withdrawal, WithdrawalQuery, WithdrawalStatus},
        repository::WithdrawalRepositoryTrait,
    },
    Database,
};
use rand::Rng;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use std::sync::Arc;
use tracing::{info, warn};
use utils::{AppError, AppResult};

const RECENT_ITEMS: usize = 5;
const REFERRAL_CODE_PREFIX: &str = "REF";
const REFERRAL_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const REFERRAL_CODE_ATTEMPTS: usize = 10;

pub type DynStaffService = Arc<dyn StaffServiceTrait + Send + Sync>;

/// 员工端：首页、推荐、积分与提现；员工ID均来自令牌
#[async_trait]
pub trait StaffServiceTrait {
    async fn dashboard(&self, staff_id: i64) -> AppResult<StaffDashboard>;

    async fn referral_code(&self, staff_id: i64) -> AppResult<ReferralCodeResponse>;

    async fn regenerate_referral_code(&self, staff_id: i64) -> AppResult<ReferralCodeResponse>;

    async fn referrals(&self, staff_id: i64, query: StaffReferralQuery) -> AppResult<Vec<Referral>>;

    async fn referral(&self, staff_id: i64, id: i64) -> AppResult<Referral>;

    async fn send_invite(&self, staff_id: i64, request: SendInviteRequest) -> AppResult<Referral>;

    async fn referral_stats(&self, staff_id: i64) -> AppResult<ReferralStats>;

    async fn points_balance(&self, staff_id: i64) -> AppResult<PointsBalance>;

    async fn points_history(&self, staff_id: i64, kind: Option<TransactionType>) -> AppResult<Vec<PointTransaction>>;

    async fn conversion_rate(&self) -> AppResult<ConversionRateInfo>;

    async fn withdrawals(&self, staff_id: i64, query: StaffWithdrawalQuery) -> AppResult<Vec<Withdrawal>>;

    /// 申请提现，按当前汇率锁定并预留积分
    async fn create_withdrawal(&self, staff_id: i64, request: CreateWithdrawalRequest) -> AppResult<Withdrawal>;

    async fn withdrawal(&self, staff_id: i64, id: i64) -> AppResult<Withdrawal>;

    async fn cancel_withdrawal(&self, staff_id: i64, id: i64) -> AppResult<Withdrawal>;

    async fn withdrawal_limits(&self) -> AppResult<WithdrawalLimits>;
}

fn generate_referral_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| REFERRAL_CODE_CHARSET[rng.gen_range(0..REFERRAL_CODE_CHARSET.len())] as char)
        .collect();
    format!("{}{}", REFERRAL_CODE_PREFIX, suffix)
}

/// 金额换算为积分，向上取整
fn points_for(amount: Decimal, rate: Decimal) -> AppResult<i64> {
    amount
        .checked_mul(rate)
        .and_then(|points| points.ceil().to_i64())
        .ok_or_else(|| AppError::BadRequest("Withdrawal amount is too large".to_string()))
}

fn format_amount(amount: Decimal) -> String {
    amount.round_dp(2).normalize().to_string()
}

/// 校验顺序：账号状态、功能开关、可用积分、最小额、最大额
fn check_withdrawal(
    user: &StaffUser,
    settings: &SystemSettings,
    amount: Decimal,
    points: i64,
) -> AppResult<()> {
    if !user.is_active {
        return Err(AppError::Forbidden("Account is inactive".to_string()));
    }
    if !settings.features.withdrawal_system || !settings.features.points_system {
        return Err(AppError::Forbidden("Withdrawals are currently disabled".to_string()));
    }
    if user.available_points() < points {
        return Err(AppError::BadRequest(format!(
            "Insufficient points balance: {} available, {} required",
            user.available_points(),
            points
        )));
    }
    if amount < settings.minimum_withdrawal {
        return Err(AppError::BadRequest(format!(
            "Minimum withdrawal amount is {} {}",
            settings.currency,
            format_amount(settings.minimum_withdrawal)
        )));
    }
    if amount > settings.maximum_withdrawal {
        return Err(AppError::BadRequest(format!(
            "Maximum withdrawal amount is {} {}",
            settings.currency,
            format_amount(settings.maximum_withdrawal)
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct StaffService {
    database: Arc<Database>,
}

impl StaffService {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    async fn current_rate(&self) -> AppResult<Decimal> {
        Ok(self.database.current_rate(Utc::now()).await?.rate)
    }
}

#[async_trait]
impl StaffServiceTrait for StaffService {
    async fn dashboard(&self, staff_id: i64) -> AppResult<StaffDashboard> {
        let user = self.database.get_staff(staff_id).await?;
        let referrals = self.database.find_referrals(&ReferralQuery::for_user(staff_id)).await?;
        let withdrawals = self.database.find_withdrawals(&WithdrawalQuery::for_user(staff_id)).await?;
        let transactions = self
            .database
            .find_transactions(&TransactionQuery::for_user(staff_id))
            .await?;

        let stats = StaffStats {
            total_referrals: user.total_referrals,
            successful_referrals: user.successful_referrals,
            pending_referrals: referrals
                .iter()
                .filter(|r| r.status == ReferralStatus::Pending)
                .count() as u64,
            total_points: user.points_balance,
            available_points: user.available_points(),
            total_withdrawals: withdrawals
                .iter()
                .filter(|w| w.status == WithdrawalStatus::Paid)
                .count() as u64,
        };

        Ok(StaffDashboard {
            user: StaffSummary::from(&user),
            stats,
            recent_referrals: referrals.into_iter().take(RECENT_ITEMS).collect(),
            recent_transactions: transactions.into_iter().take(RECENT_ITEMS).collect(),
        })
    }

    async fn referral_code(&self, staff_id: i64) -> AppResult<ReferralCodeResponse> {
        let user = self.database.get_staff(staff_id).await?;
        Ok(ReferralCodeResponse {
            referral_code: user.referral_code,
        })
    }

    async fn regenerate_referral_code(&self, staff_id: i64) -> AppResult<ReferralCodeResponse> {
        for _ in 0..REFERRAL_CODE_ATTEMPTS {
            let code = generate_referral_code();
            match self.database.set_referral_code(staff_id, code).await {
                Ok(user) => {
                    info!("🔁 员工 {} 推荐码更新为 {}", staff_id, user.referral_code);
                    return Ok(ReferralCodeResponse {
                        referral_code: user.referral_code,
                    });
                }
                Err(AppError::Conflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        warn!("⚠️ 员工 {} 推荐码生成多次冲突", staff_id);
        Err(AppError::InternalServerErrorWithContext(
            "Could not generate a unique referral code".to_string(),
        ))
    }

    async fn referrals(&self, staff_id: i64, query: StaffReferralQuery) -> AppResult<Vec<Referral>> {
        self.database
            .find_referrals(&ReferralQuery {
                status: query.status,
                user_id: Some(staff_id),
                ..Default::default()
            })
            .await
    }

    async fn referral(&self, staff_id: i64, id: i64) -> AppResult<Referral> {
        match self.database.get_referral(id).await? {
            referral if referral.user_id == staff_id => Ok(referral),
            _ => Err(AppError::NotFound("Referral not found".to_string())),
        }
    }

    async fn send_invite(&self, staff_id: i64, request: SendInviteRequest) -> AppResult<Referral> {
        let user = self.database.get_staff(staff_id).await?;
        if !user.is_active {
            return Err(AppError::Forbidden("Account is inactive".to_string()));
        }
        if !self.database.get_settings().await?.features.referral_system {
            return Err(AppError::Forbidden("The referral program is currently disabled".to_string()));
        }
        if request.email.trim().eq_ignore_ascii_case(&user.email) {
            return Err(AppError::BadRequest("You cannot refer yourself".to_string()));
        }

        let referral = self
            .database
            .create_referral(NewReferral {
                user_id: staff_id,
                referee_name: request.referee_name(),
                referee_email: request.email.trim().to_string(),
                referee_phone: request.phone.clone().unwrap_or_default(),
                notes: request.notes.clone().unwrap_or_default(),
            })
            .await?;

        activity::notify(
            &self.database,
            NewNotification::new(
                staff_id,
                NotificationType::Referral,
                "Referral Submitted",
                format!("Your referral of {} is pending review", referral.referee_name),
            ),
        )
        .await?;

        Ok(referral)
    }

    async fn referral_stats(&self, staff_id: i64) -> AppResult<ReferralStats> {
        self.database.get_staff(staff_id).await?;
        self.database.referral_stats(Some(staff_id)).await
    }

    async fn points_balance(&self, staff_id: i64) -> AppResult<PointsBalance> {
        let user = self.database.get_staff(staff_id).await?;
        let rate = self.current_rate().await?;
        let settings = self.database.get_settings().await?;

        let available = user.available_points();
        let cash_value = if rate.is_zero() {
            Decimal::ZERO
        } else {
            (Decimal::from(available) / rate).round_dp(2)
        };

        Ok(PointsBalance {
            balance: user.points_balance,
            frozen: user.frozen_points,
            available,
            cash_value,
            rate,
            currency: settings.currency,
        })
    }

    async fn points_history(&self, staff_id: i64, kind: Option<TransactionType>) -> AppResult<Vec<PointTransaction>> {
        self.database
            .find_transactions(&TransactionQuery {
                user_id: Some(staff_id),
                kind,
                ..Default::default()
            })
            .await
    }

    async fn conversion_rate(&self) -> AppResult<ConversionRateInfo> {
        let rate = self.current_rate().await?;
        let currency = self.database.get_settings().await?.currency;

        Ok(ConversionRateInfo {
            description: format!("{} points = 1 {}", rate.normalize(), currency),
            rate,
            currency,
        })
    }

    async fn withdrawals(&self, staff_id: i64, query: StaffWithdrawalQuery) -> AppResult<Vec<Withdrawal>> {
        self.database
            .find_withdrawals(&WithdrawalQuery {
                status: query.status,
                user_id: Some(staff_id),
                ..Default::default()
            })
            .await
    }

    async fn create_withdrawal(&self, staff_id: i64, request: CreateWithdrawalRequest) -> AppResult<Withdrawal> {
        let user = self.database.get_staff(staff_id).await?;
        let settings = self.database.get_settings().await?;
        let rate = self.current_rate().await?;

        let amount = request.amount.round_dp(2);
        let points = points_for(amount, rate)?;
        check_withdrawal(&user, &settings, amount, points)?;

        let (withdrawal, _) = self
            .database
            .create_withdrawal(NewWithdrawal {
                user_id: staff_id,
                points,
                conversion_rate: rate,
                amount,
                currency: settings.currency.clone(),
                bank_name: request.bank_name.trim().to_string(),
                account_number: request.account_number.trim().to_string(),
                account_name: request.account_name.trim().to_string(),
            })
            .await?;

        activity::notify(
            &self.database,
            NewNotification::new(
                staff_id,
                NotificationType::Withdrawal,
                "Withdrawal Requested",
                format!(
                    "Your withdrawal of {} {} ({} points) is pending approval",
                    withdrawal.currency,
                    format_amount(withdrawal.amount),
                    withdrawal.points
                ),
            ),
        )
        .await?;

        Ok(withdrawal)
    }

    async fn withdrawal(&self, staff_id: i64, id: i64) -> AppResult<Withdrawal> {
        match self.database.get_withdrawal(id).await? {
            withdrawal if withdrawal.user_id == staff_id => Ok(withdrawal),
            _ => Err(AppError::NotFound("Withdrawal not found".to_string())),
        }
    }

    async fn cancel_withdrawal(&self, staff_id: i64, id: i64) -> AppResult<Withdrawal> {
        let (withdrawal, refund) = self.database.cancel_withdrawal(staff_id, id).await?;
        info!("↩️ 提现 {} 已取消，退回 {} 积分", withdrawal.id, refund.amount);
        Ok(withdrawal)
    }

    async fn withdrawal_limits(&self) -> AppResult<WithdrawalLimits> {
        let settings = self.database.get_settings().await?;
        let rate = self.current_rate().await?;

        Ok(WithdrawalLimits {
            minimum_points: points_for(settings.minimum_withdrawal, rate)?,
            maximum_points: points_for(settings.maximum_withdrawal, rate)?,
            currency: settings.currency,
            rate,
            minimum: settings.minimum_withdrawal,
            maximum: settings.maximum_withdrawal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::settings::model::FeatureFlagsPatch;

    async fn service() -> (StaffService, Arc<Database>) {
        let database = Arc::new(Database::new_for_test().await);
        (StaffService::new(database.clone()), database)
    }

    fn withdrawal_request(amount: i64) -> CreateWithdrawalRequest {
        CreateWithdrawalRequest {
            amount: Decimal::from(amount),
            bank_name: "GTBank".to_string(),
            account_number: "0123456789".to_string(),
            account_name: "Adewale Johnson".to_string(),
        }
    }

    /// 把员工可用积分调到指定值
    async fn set_available(database: &Database, staff_id: i64, target: i64) {
        let user = database.get_staff(staff_id).await.unwrap();
        let delta = target - user.available_points();
        if delta != 0 {
            let kind = if delta > 0 { TransactionType::Bonus } else { TransactionType::Deduction };
            database
                .apply_points_change(database::points::model::PointsChange::new(staff_id, kind, delta, "test"))
                .await
                .unwrap();
        }
    }

    #[test]
    fn test_referral_code_format() {
        let code = generate_referral_code();
        assert_eq!(code.len(), 9);
        assert!(code.starts_with("REF"));
        assert!(code[3..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_points_round_up() {
        assert_eq!(points_for(Decimal::new(500001, 2), Decimal::from(10)).unwrap(), 50_001);
        assert_eq!(points_for(Decimal::from(5_000), Decimal::new(125, 1)).unwrap(), 62_500);
    }

    #[test]
    fn test_points_overflow_is_rejected() {
        let err = points_for(Decimal::MAX, Decimal::from(10)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        // 乘积未溢出 Decimal 但超出 i64
        assert!(points_for(Decimal::from(i64::MAX), Decimal::from(10)).is_err());
    }

    #[tokio::test]
    async fn test_oversized_withdrawal_amount_is_bad_request() {
        let (service, _) = service().await;
        let mut request = withdrawal_request(6_000);
        request.amount = Decimal::MAX;

        let err = service.create_withdrawal(4, request).await.unwrap_err();
        assert_eq!(err.to_string(), "Withdrawal amount is too large");
    }

    #[tokio::test]
    async fn test_limits_with_huge_rate_is_bad_request() {
        let (service, database) = service().await;
        database.replace_active_rate(Decimal::MAX, "admin-1").await.unwrap();

        assert!(matches!(service.withdrawal_limits().await, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_dashboard_summary() {
        let (service, _) = service().await;
        let dashboard = service.dashboard(1).await.unwrap();

        assert_eq!(dashboard.user.first_name, "Adewale");
        assert_eq!(dashboard.stats.total_referrals, 18);
        assert!(dashboard.recent_referrals.len() <= 5);
        assert!(dashboard.recent_transactions.len() <= 5);
        assert!(dashboard.recent_referrals.iter().all(|r| r.user_id == 1));
    }

    #[tokio::test]
    async fn test_regenerate_referral_code() {
        let (service, _) = service().await;
        let before = service.referral_code(1).await.unwrap();
        let after = service.regenerate_referral_code(1).await.unwrap();

        assert_ne!(before.referral_code, after.referral_code);
        assert_eq!(service.referral_code(1).await.unwrap().referral_code, after.referral_code);
    }

    #[tokio::test]
    async fn test_invite_and_duplicate() {
        let (service, _) = service().await;
        let request = SendInviteRequest {
            email: "new.hire@example.com".to_string(),
            name: Some("New Hire".to_string()),
            phone: None,
            notes: None,
        };

        let referral = service.send_invite(2, request.clone()).await.unwrap();
        assert_eq!(referral.status, ReferralStatus::Pending);
        assert_eq!(service.referral(2, referral.id).await.unwrap().id, referral.id);
        // 他人的推荐不可见
        assert!(matches!(service.referral(3, referral.id).await, Err(AppError::NotFound(_))));

        let err = service.send_invite(3, request).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_invite_blocked_when_referrals_disabled() {
        let (service, database) = service().await;
        database
            .update_settings(Box::new(|s| {
                s.features.merge(FeatureFlagsPatch {
                    referral_system: Some(false),
                    ..Default::default()
                });
                Ok(())
            }))
            .await
            .unwrap();

        let err = service
            .send_invite(
                2,
                SendInviteRequest {
                    email: "someone@example.com".to_string(),
                    name: None,
                    phone: None,
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_balance_and_rate_description() {
        let (service, database) = service().await;
        set_available(&database, 4, 12_345).await;

        let balance = service.points_balance(4).await.unwrap();
        assert_eq!(balance.available, 12_345);
        assert_eq!(balance.cash_value, Decimal::new(12345, 1).round_dp(2));
        assert_eq!(balance.currency, "NGN");

        let rate = service.conversion_rate().await.unwrap();
        assert_eq!(rate.description, "10 points = 1 NGN");
    }

    #[tokio::test]
    async fn test_create_withdrawal_reserves_points() {
        let (service, database) = service().await;
        set_available(&database, 4, 80_000).await;

        let withdrawal = service.create_withdrawal(4, withdrawal_request(6_000)).await.unwrap();
        assert_eq!(withdrawal.points, 60_000);
        assert_eq!(withdrawal.conversion_rate, Decimal::from(10));
        assert_eq!(withdrawal.status, WithdrawalStatus::Pending);
        assert_eq!(database.get_staff(4).await.unwrap().available_points(), 20_000);

        service.cancel_withdrawal(4, withdrawal.id).await.unwrap();
        assert_eq!(database.get_staff(4).await.unwrap().available_points(), 80_000);
        assert!(service.withdrawal(4, withdrawal.id).await.is_err());
    }

    #[tokio::test]
    async fn test_withdrawal_check_order() {
        let (service, database) = service().await;
        set_available(&database, 4, 30_000).await;

        // 余额不足优先于最小额
        let err = service.create_withdrawal(4, withdrawal_request(4_000)).await.unwrap_err();
        assert!(err.to_string().starts_with("Insufficient points balance"));

        set_available(&database, 4, 2_000_000).await;
        let err = service.create_withdrawal(4, withdrawal_request(4_000)).await.unwrap_err();
        assert_eq!(err.to_string(), "Minimum withdrawal amount is NGN 5000");

        let err = service.create_withdrawal(4, withdrawal_request(150_000)).await.unwrap_err();
        assert_eq!(err.to_string(), "Maximum withdrawal amount is NGN 100000");

        // 停用账号最先被拒绝
        database.set_staff_active(4, false).await.unwrap();
        let err = service.create_withdrawal(4, withdrawal_request(150_000)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_limits_in_points() {
        let (service, _) = service().await;
        let limits = service.withdrawal_limits().await.unwrap();
        assert_eq!(limits.minimum_points, 50_000);
        assert_eq!(limits.maximum_points, 1_000_000);
    }
}
