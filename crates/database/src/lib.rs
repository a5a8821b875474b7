////////////////////////////////////////////////////////////////////////
//
// 1. 每个Domain(Entity)单独一个文件夹
// 2. 每个Domain由两部分组成:
//    - model: 定义Schema
//    - repository: 集合上的实际操作（trait 实现于 Database）
// 3. 数据全部保存在进程内存中，启动时由 seed 生成，重启即重置
//
//////////////////////////////////////////////////////////////////////

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use utils::{AppConfig, AppResult};

pub mod admin;
pub mod audit;
pub mod collection;
pub mod notification;
pub mod overrides;
pub mod pagination;
pub mod points;
pub mod rate;
pub mod referral;
pub mod report;
pub mod seed;
pub mod session;
pub mod settings;
pub mod staff;
pub mod support;
pub mod withdrawal;

use collection::Collection;
use seed::Fixtures;

#[derive(Clone, Debug)]
pub struct Database {
    pub staff_users: Arc<Collection<staff::model::StaffUser>>,
    pub admin_users: Arc<Collection<admin::model::AdminUser>>,
    pub referrals: Arc<Collection<referral::model::Referral>>,
    pub withdrawals: Arc<Collection<withdrawal::model::Withdrawal>>,
    pub point_transactions: Arc<Collection<points::model::PointTransaction>>,
    pub notifications: Arc<Collection<notification::model::Notification>>,
    pub audit_logs: Arc<Collection<audit::model::AuditLog>>,
    pub conversion_rates: Arc<Collection<rate::model::ConversionRate>>,
    pub reports: Arc<Collection<report::model::Report>>,
    pub faqs: Arc<Collection<support::model::FaqEntry>>,
    pub support_requests: Arc<Collection<support::model::SupportRequest>>,
    pub override_records: Arc<Collection<overrides::model::OverrideRecord>>,
    // 会话存储
    pub refresh_sessions: Arc<Collection<session::model::RefreshSession>>,
    pub revoked_tokens: Arc<Collection<session::model::RevokedToken>>,
    pub reset_tokens: Arc<Collection<session::model::ResetToken>>,
    // 单例
    pub settings: Arc<RwLock<settings::model::SystemSettings>>,
}

impl Database {
    pub async fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let fixtures = Fixtures::generate(
            config.fixture_seed,
            config.referral_points,
            &config.default_currency,
            chrono::Utc::now(),
        )?;

        let database = Self::from_fixtures(fixtures);

        info!(
            "🧱 database seeded (seed={}): {} staff, {} referrals, {} withdrawals, {} transactions",
            config.fixture_seed,
            database.staff_users.count().await,
            database.referrals.count().await,
            database.withdrawals.count().await,
            database.point_transactions.count().await,
        );

        Ok(database)
    }

    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        Database {
            staff_users: Arc::new(Collection::with_documents("StaffUser", fixtures.staff)),
            admin_users: Arc::new(Collection::with_documents("AdminUser", fixtures.admins)),
            referrals: Arc::new(Collection::with_documents("Referral", fixtures.referrals)),
            withdrawals: Arc::new(Collection::with_documents("Withdrawal", fixtures.withdrawals)),
            point_transactions: Arc::new(Collection::with_documents("PointTransaction", fixtures.transactions)),
            notifications: Arc::new(Collection::with_documents("Notification", fixtures.notifications)),
            audit_logs: Arc::new(Collection::with_documents("AuditLog", fixtures.audit_logs)),
            conversion_rates: Arc::new(Collection::with_documents("ConversionRate", fixtures.rates)),
            reports: Arc::new(Collection::with_documents("Report", fixtures.reports)),
            faqs: Arc::new(Collection::with_documents("Faq", fixtures.faqs)),
            support_requests: Arc::new(Collection::new("SupportRequest")),
            override_records: Arc::new(Collection::new("OverrideRecord")),
            refresh_sessions: Arc::new(Collection::new("RefreshSession")),
            revoked_tokens: Arc::new(Collection::new("RevokedToken")),
            reset_tokens: Arc::new(Collection::new("ResetToken")),
            settings: Arc::new(RwLock::new(fixtures.settings)),
        }
    }

    /// 使用测试配置生成的数据库
    pub async fn new_for_test() -> Self {
        let config = Arc::new(AppConfig::new_for_test());
        match Self::new(config).await {
            Ok(database) => database,
            Err(e) => panic!("failed to seed test database: {}", e),
        }
    }
}
