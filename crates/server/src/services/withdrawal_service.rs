use crate::{
    dtos::{
        common::PageData,
        withdrawal_dto::{ExportFile, ExportFormat, ExportWithdrawalsRequest, WithdrawalListQuery, WithdrawalView},
    },
    extractors::Actor,
    services::activity,
};
use async_trait::async_trait;
use chrono::Utc;
use database::{
    admin::repository::AdminRepositoryTrait,
    notification::model::{NewNotification, NotificationType},
    rate::repository::RateRepositoryTrait,
    withdrawal::{
        model::{Withdrawal, WithdrawalQuery, WithdrawalStatus, WithdrawalTransition},
        repository::WithdrawalRepositoryTrait,
    },
    Database,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};
use utils::{AppError, AppResult};

/// 银行文件中的付款方名称
const PAYER_NAME: &str = "Referral Hub";
const ABA_DESCRIPTION: &str = "REFERRAL BONUS";

pub type DynWithdrawalService = Arc<dyn WithdrawalServiceTrait + Send + Sync>;

#[async_trait]
pub trait WithdrawalServiceTrait {
    async fn list_withdrawals(&self, query: WithdrawalListQuery) -> AppResult<PageData<WithdrawalView>>;

    async fn get_withdrawal(&self, id: i64) -> AppResult<WithdrawalView>;

    async fn approve(&self, actor: &Actor, id: i64) -> AppResult<Withdrawal>;

    /// 驳回并退回预留积分
    async fn reject(&self, actor: &Actor, id: i64, reason: String) -> AppResult<Withdrawal>;

    async fn process(&self, actor: &Actor, id: i64) -> AppResult<Withdrawal>;

    async fn complete(&self, actor: &Actor, id: i64) -> AppResult<Withdrawal>;

    async fn pending_count(&self) -> AppResult<u64>;

    async fn export(&self, actor: &Actor, request: ExportWithdrawalsRequest) -> AppResult<ExportFile>;
}

/// 按当前汇率折算的金额与锁定金额之差
pub fn rate_difference(withdrawal: &Withdrawal, current_rate: Decimal) -> Option<Decimal> {
    if current_rate.is_zero() || withdrawal.conversion_rate == current_rate {
        return None;
    }
    let at_current = Decimal::from(withdrawal.points).checked_div(current_rate)?;
    Some(at_current.checked_sub(withdrawal.amount)?.round_dp(2))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn render_csv(items: &[Withdrawal]) -> String {
    let mut out =
        String::from("Employee,Account Name,Account Number,Bank,Reference,Points,Amount,Currency,Status,Date\n");
    for w in items {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            csv_field(&w.user_name),
            csv_field(&w.account_name),
            csv_field(&w.account_number),
            csv_field(&w.bank_name),
            w.id,
            w.points,
            w.amount.round_dp(2),
            w.currency,
            w.status,
            w.created_at.format("%Y-%m-%d"),
        ));
    }
    out
}

fn render_bank_text(items: &[Withdrawal]) -> String {
    let rule = "=".repeat(80);
    let mut out = format!(
        "Bank Payments - {}\nPeriod: {}\n\nEmployee | Account Name | Account Number | Bank | Reference | Amount\n{}\n",
        PAYER_NAME,
        Utc::now().format("%Y-%m-%d"),
        rule
    );
    for w in items {
        out.push_str(&format!(
            "{} | {} | {} | {} | {} | {} {:.2}\n",
            w.user_name, w.account_name, w.account_number, w.bank_name, w.id, w.currency, w.amount
        ));
    }
    let total: Decimal = items.iter().map(|w| w.amount).sum();
    out.push_str(&format!("{}\nTotal: {:.2}\n", rule, total));
    out
}

/// ABA 记录定长 120 字符
const ABA_RECORD_WIDTH: usize = 120;
const ABA_ACCOUNT_WIDTH: usize = 9;
const ABA_AMOUNT_WIDTH: usize = 10;
const PAYER_BSB: &str = "062-000";
const PAYER_ACCOUNT: &str = "123456789";
const APCA_USER_ID: &str = "001234";

/// 金额转为分，左补零到固定宽度；超出宽度视为无法导出
fn aba_cents(amount: Decimal) -> AppResult<String> {
    let cents = amount
        .checked_mul(Decimal::from(100))
        .map(|c| c.round().trunc().to_string())
        .filter(|c| c.len() <= ABA_AMOUNT_WIDTH)
        .ok_or_else(|| AppError::BadRequest(format!("Amount {} is too large for an ABA file", amount)))?;
    Ok(format!("{:0>width$}", cents, width = ABA_AMOUNT_WIDTH))
}

fn aba_text(value: &str, width: usize) -> String {
    let truncated: String = value.chars().take(width).collect();
    format!("{:<width$}", truncated, width = width)
}

/// 收款账号右对齐补空格，超长直接拒绝
fn aba_account(withdrawal: &Withdrawal) -> AppResult<String> {
    let account = withdrawal.account_number.trim();
    if account.is_empty() || account.chars().count() > ABA_ACCOUNT_WIDTH {
        return Err(AppError::BadRequest(format!(
            "Account number of withdrawal #{} must be 1-{} characters for an ABA file",
            withdrawal.id, ABA_ACCOUNT_WIDTH
        )));
    }
    Ok(format!("{:>width$}", account, width = ABA_ACCOUNT_WIDTH))
}

fn render_aba(items: &[Withdrawal]) -> AppResult<String> {
    let mut lines = Vec::with_capacity(items.len() + 2);
    lines.push(format!(
        "0{:17}01{:3}{:7}{}{}{}{}{:40}",
        "",
        "BQL",
        "",
        aba_text(PAYER_NAME, 26),
        APCA_USER_ID,
        aba_text("Payout", 12),
        Utc::now().format("%d%m%y"),
        ""
    ));

    let mut total = Decimal::ZERO;
    for w in items {
        total = total
            .checked_add(w.amount)
            .ok_or_else(|| AppError::BadRequest("Export total is too large for an ABA file".to_string()))?;
        lines.push(format!(
            "1{}{} 50{}{}{}{}{}{}00000000",
            PAYER_BSB,
            aba_account(w)?,
            aba_cents(w.amount)?,
            aba_text(&w.account_name, 32),
            aba_text(ABA_DESCRIPTION, 18),
            PAYER_BSB,
            PAYER_ACCOUNT,
            aba_text(PAYER_NAME, 16),
        ));
    }

    let total = aba_cents(total)?;
    lines.push(format!(
        "7999-999{:12}{}{}{}{:24}{:0>6}{:40}",
        "",
        total,
        total,
        "0".repeat(ABA_AMOUNT_WIDTH),
        "",
        items.len(),
        ""
    ));

    debug_assert!(lines.iter().all(|l| l.chars().count() == ABA_RECORD_WIDTH));
    Ok(lines.join("\r\n"))
}

#[derive(Clone)]
pub struct WithdrawalService {
    database: Arc<Database>,
}

impl WithdrawalService {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    async fn current_rate(&self) -> AppResult<Decimal> {
        Ok(self.database.current_rate(Utc::now()).await?.rate)
    }

    fn view(withdrawal: Withdrawal, current_rate: Decimal) -> WithdrawalView {
        WithdrawalView {
            rate_difference: rate_difference(&withdrawal, current_rate),
            withdrawal,
        }
    }

    async fn admin_name(&self, actor: &Actor) -> String {
        match self.database.get_admin(&actor.user.subject).await {
            Ok(admin) => admin.name,
            Err(_) => actor.user.subject.clone(),
        }
    }

    async fn transition(
        &self,
        actor: &Actor,
        id: i64,
        status: WithdrawalStatus,
        rejection_reason: Option<String>,
    ) -> AppResult<Withdrawal> {
        let processed_by = self.admin_name(actor).await;
        let (withdrawal, refund) = self
            .database
            .transition_withdrawal(
                id,
                WithdrawalTransition {
                    status,
                    processed_by,
                    rejection_reason,
                    force: false,
                },
            )
            .await?;

        let action = match status {
            WithdrawalStatus::Approved => "Withdrawal approved",
            WithdrawalStatus::Processing => "Withdrawal processing",
            WithdrawalStatus::Paid => "Withdrawal paid",
            WithdrawalStatus::Rejected => "Withdrawal rejected",
            WithdrawalStatus::Pending => "Withdrawal updated",
        };
        let mut description = format!(
            "{} {} {:.2} for {} ({} points)",
            action, withdrawal.currency, withdrawal.amount, withdrawal.user_name, withdrawal.points
        );
        if let Some(reason) = &withdrawal.rejection_reason {
            description.push_str(&format!("; reason: {}", reason));
        }
        activity::record_audit(
            &self.database,
            actor,
            action,
            format!("Withdrawal {}", withdrawal.id),
            description,
        )
        .await?;

        let message = match (status, &refund) {
            (WithdrawalStatus::Rejected, Some(tx)) => format!(
                "Your withdrawal of {} {:.2} was rejected. {} points have been returned to your balance.",
                withdrawal.currency, withdrawal.amount, tx.amount
            ),
            _ => format!(
                "Your withdrawal of {} {:.2} is now {}",
                withdrawal.currency, withdrawal.amount, withdrawal.status
            ),
        };
        activity::notify(
            &self.database,
            NewNotification::new(
                withdrawal.user_id,
                NotificationType::Withdrawal,
                format!("Withdrawal {}", withdrawal.status),
                message,
            ),
        )
        .await?;

        Ok(withdrawal)
    }
}

#[async_trait]
impl WithdrawalServiceTrait for WithdrawalService {
    async fn list_withdrawals(&self, query: WithdrawalListQuery) -> AppResult<PageData<WithdrawalView>> {
        debug!("🔍 提现列表查询: {:?}", query);

        let rate = self.current_rate().await?;
        let withdrawals = self.database.find_withdrawals(&query.to_query()).await?;
        let page = PageData::paginate(&withdrawals, query.pagination());

        Ok(PageData {
            items: page.items.into_iter().map(|w| Self::view(w, rate)).collect(),
            meta: page.meta,
        })
    }

    async fn get_withdrawal(&self, id: i64) -> AppResult<WithdrawalView> {
        let rate = self.current_rate().await?;
        let withdrawal = self.database.get_withdrawal(id).await?;
        Ok(Self::view(withdrawal, rate))
    }

    async fn approve(&self, actor: &Actor, id: i64) -> AppResult<Withdrawal> {
        self.transition(actor, id, WithdrawalStatus::Approved, None).await
    }

    async fn reject(&self, actor: &Actor, id: i64, reason: String) -> AppResult<Withdrawal> {
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(AppError::BadRequest("Rejection reason is required".to_string()));
        }
        self.transition(actor, id, WithdrawalStatus::Rejected, Some(reason)).await
    }

    async fn process(&self, actor: &Actor, id: i64) -> AppResult<Withdrawal> {
        self.transition(actor, id, WithdrawalStatus::Processing, None).await
    }

    async fn complete(&self, actor: &Actor, id: i64) -> AppResult<Withdrawal> {
        self.transition(actor, id, WithdrawalStatus::Paid, None).await
    }

    async fn pending_count(&self) -> AppResult<u64> {
        let pending = self
            .database
            .find_withdrawals(&WithdrawalQuery {
                status: Some(WithdrawalStatus::Pending),
                ..Default::default()
            })
            .await?;
        Ok(pending.len() as u64)
    }

    async fn export(&self, actor: &Actor, request: ExportWithdrawalsRequest) -> AppResult<ExportFile> {
        let all = self.database.find_withdrawals(&WithdrawalQuery::default()).await?;

        // 保持请求中的顺序
        let mut items = Vec::with_capacity(request.ids.len());
        for id in &request.ids {
            match all.iter().find(|w| w.id == *id) {
                Some(w) => items.push(w.clone()),
                None => {
                    warn!("⚠️ 导出的提现 {} 不存在", id);
                    return Err(AppError::NotFound(format!("Withdrawal {} not found", id)));
                }
            }
        }

        let body = match request.format {
            ExportFormat::Csv => render_csv(&items),
            ExportFormat::BankText => render_bank_text(&items),
            ExportFormat::Aba => render_aba(&items)?,
        };

        activity::record_audit(
            &self.database,
            actor,
            "Withdrawals exported",
            "Withdrawals",
            format!("Exported {} withdrawal(s) as {}", items.len(), request.format.extension()),
        )
        .await?;

        info!("📤 导出 {} 条提现记录 ({:?})", items.len(), request.format);
        Ok(ExportFile {
            filename: format!(
                "withdrawals-{}.{}",
                Utc::now().format("%Y-%m-%d"),
                request.format.extension()
            ),
            content_type: request.format.content_type(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::admin_actor;
    use database::{
        notification::repository::NotificationRepositoryTrait,
        points::{model::TransactionQuery, repository::PointsRepositoryTrait},
        staff::repository::StaffRepositoryTrait,
    };

    async fn service() -> (WithdrawalService, Arc<Database>) {
        let database = Arc::new(Database::new_for_test().await);
        (WithdrawalService::new(database.clone()), database)
    }

    async fn first_with(database: &Database, status: WithdrawalStatus) -> Withdrawal {
        database
            .find_withdrawals(&WithdrawalQuery {
                status: Some(status),
                ..Default::default()
            })
            .await
            .unwrap()
            .remove(0)
    }

    fn sample(points: i64, rate: i64, amount: Decimal) -> Withdrawal {
        Withdrawal {
            id: 7,
            user_id: 1,
            user_name: "Adewale Johnson".to_string(),
            points,
            conversion_rate: Decimal::from(rate),
            amount,
            currency: "NGN".to_string(),
            status: WithdrawalStatus::Pending,
            bank_name: "GTBank".to_string(),
            account_number: "0123456789".to_string(),
            account_name: "Adewale Johnson".to_string(),
            created_at: Utc::now(),
            processed_at: None,
            processed_by: None,
            rejection_reason: None,
        }
    }

    #[test]
    fn test_rate_difference() {
        let w = sample(100_000, 10, Decimal::from(10_000));
        assert_eq!(rate_difference(&w, Decimal::from(10)), None);
        assert_eq!(rate_difference(&w, Decimal::from(8)), Some(Decimal::from(2_500)));
        assert_eq!(rate_difference(&w, Decimal::from(20)), Some(Decimal::from(-5_000)));
    }

    #[test]
    fn test_export_renderers() {
        let items = vec![sample(60_000, 10, Decimal::from(6_000))];

        let csv = render_csv(&items);
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("Employee,Account Name"));
        assert!(lines.next().unwrap().contains("Adewale Johnson,0123456789,GTBank,7,60000,6000"));

        let text = render_bank_text(&items);
        assert!(text.contains("Total: 6000.00"));

        let mut items = items;
        items[0].account_number = "123456789".to_string();
        let aba = render_aba(&items).unwrap();
        let lines: Vec<_> = aba.split("\r\n").collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.chars().count() == 120));
        assert!(lines[1].starts_with("1062-000123456789 500000600000Adewale Johnson"));
        assert_eq!(&lines[1][80..96], "062-000123456789");
        assert!(lines[2].starts_with("7999-999"));
        assert_eq!(&lines[2][20..50], "000060000000006000000000000000");
        assert_eq!(&lines[2][74..80], "000001");
    }

    #[test]
    fn test_aba_keeps_full_account_number() {
        let mut w = sample(60_000, 10, Decimal::from(6_000));
        w.account_number = "12345".to_string();
        let aba = render_aba(&[w.clone()]).unwrap();
        assert_eq!(&aba.split("\r\n").nth(1).unwrap()[8..17], "    12345");

        // 十位账号放不进九位字段，不能截断
        w.account_number = "6761070407".to_string();
        let err = render_aba(&[w]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_aba_rejects_amount_wider_than_field() {
        let w = sample(60_000, 10, Decimal::from(100_000_000));
        assert!(matches!(render_aba(&[w]), Err(AppError::BadRequest(_))));

        let w = sample(60_000, 10, Decimal::MAX);
        assert!(matches!(render_aba(&[w]), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_csv_quotes_commas() {
        assert_eq!(csv_field("Okafor, Chioma"), "\"Okafor, Chioma\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[tokio::test]
    async fn test_reject_refunds_and_notifies() {
        let (service, database) = service().await;
        let pending = first_with(&database, WithdrawalStatus::Pending).await;
        let before = database.get_staff(pending.user_id).await.unwrap();

        let rejected = service
            .reject(&admin_actor("admin-1"), pending.id, "Bank details mismatch".to_string())
            .await
            .unwrap();
        assert_eq!(rejected.status, WithdrawalStatus::Rejected);
        assert_eq!(rejected.processed_by.as_deref(), Some("Admin Super"));
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Bank details mismatch"));

        let after = database.get_staff(pending.user_id).await.unwrap();
        assert_eq!(after.points_balance, before.points_balance + pending.points);

        // 退款只抵消申请时的预留
        let linked: Vec<_> = database
            .find_transactions(&TransactionQuery::for_user(pending.user_id))
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.withdrawal_id == Some(pending.id))
            .collect();
        assert_eq!(linked.len(), 2);
        assert_eq!(linked.iter().map(|t| t.amount).sum::<i64>(), 0);

        let notifications = database.find_notifications(pending.user_id).await.unwrap();
        assert_eq!(notifications[0].title, "Withdrawal rejected");
    }

    #[tokio::test]
    async fn test_lifecycle_to_paid() {
        let (service, database) = service().await;
        let actor = admin_actor("admin-1");
        let pending = first_with(&database, WithdrawalStatus::Pending).await;
        let count = service.pending_count().await.unwrap();

        service.approve(&actor, pending.id).await.unwrap();
        assert_eq!(service.pending_count().await.unwrap(), count - 1);

        // 已批准的不能直接完成
        assert!(service.complete(&actor, pending.id).await.is_err());

        service.process(&actor, pending.id).await.unwrap();
        let paid = service.complete(&actor, pending.id).await.unwrap();
        assert_eq!(paid.status, WithdrawalStatus::Paid);

        let err = service.reject(&actor, pending.id, "late".to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_export_unknown_id() {
        let (service, _) = service().await;
        let err = service
            .export(
                &admin_actor("admin-1"),
                ExportWithdrawalsRequest {
                    ids: vec![999_999],
                    format: ExportFormat::Csv,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
