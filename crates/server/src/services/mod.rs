////////////////////////////////////////////////////////////////////////
//
// 1. 每个业务域一个 service 文件，对外暴露 trait object (DynXxxService)
// 2. service 只依赖 Database 上的 repository trait，不直接操作集合
// 3. 审计与通知统一经过 activity 模块写入
//
//////////////////////////////////////////////////////////////////////

pub mod account_service;
pub mod activity;
pub mod audit_service;
pub mod auth_service;
pub mod dashboard_service;
pub mod points_service;
pub mod referral_service;
pub mod settings_service;
pub mod staff_service;
pub mod user_service;
pub mod withdrawal_service;

#[cfg(test)]
pub mod test_support;

use crate::auth::{AuthConfig, AuthState, JwtManager, PermissionManager};
use account_service::{AccountService, DynAccountService};
use audit_service::{AuditService, DynAuditService};
use auth_service::{AuthService, DynAuthService};
use dashboard_service::{DashboardService, DynDashboardService};
use database::{session::repository::DynSessionRepository, Database};
use points_service::{DynPointsService, PointsService};
use referral_service::{DynReferralService, ReferralService};
use settings_service::{DynSettingsService, SettingsService};
use staff_service::{DynStaffService, StaffService};
use std::sync::Arc;
use tracing::info;
use user_service::{DynUserService, UserService};
use utils::AppConfig;
use withdrawal_service::{DynWithdrawalService, WithdrawalService};

#[derive(Clone)]
pub struct Services {
    pub auth: DynAuthService,
    pub dashboard: DynDashboardService,
    pub users: DynUserService,
    pub referrals: DynReferralService,
    pub withdrawals: DynWithdrawalService,
    pub points: DynPointsService,
    pub audit: DynAuditService,
    pub settings: DynSettingsService,
    pub staff: DynStaffService,
    pub account: DynAccountService,
    pub jwt_manager: Arc<JwtManager>,
    pub permissions: Arc<PermissionManager>,
    pub database: Arc<Database>,
}

impl Services {
    pub fn new(db: Database, config: Arc<AppConfig>) -> Self {
        let database = Arc::new(db);
        let jwt_manager = Arc::new(JwtManager::new(AuthConfig::from_app_config(&config)));
        let permissions = Arc::new(PermissionManager::new());

        let auth = Arc::new(AuthService::new(
            database.clone(),
            jwt_manager.clone(),
            permissions.clone(),
            config.clone(),
        )) as DynAuthService;
        let dashboard = Arc::new(DashboardService::new(database.clone())) as DynDashboardService;
        let users = Arc::new(UserService::new(database.clone())) as DynUserService;
        let referrals =
            Arc::new(ReferralService::new(database.clone(), config.referral_points)) as DynReferralService;
        let withdrawals = Arc::new(WithdrawalService::new(database.clone())) as DynWithdrawalService;
        let points = Arc::new(PointsService::new(database.clone())) as DynPointsService;
        let audit = Arc::new(AuditService::new(database.clone())) as DynAuditService;
        let settings = Arc::new(SettingsService::new(database.clone(), permissions.clone())) as DynSettingsService;
        let staff = Arc::new(StaffService::new(database.clone())) as DynStaffService;
        let account = Arc::new(AccountService::new(database.clone())) as DynAccountService;

        info!("🧠 services initialized");

        Self {
            auth,
            dashboard,
            users,
            referrals,
            withdrawals,
            points,
            audit,
            settings,
            staff,
            account,
            jwt_manager,
            permissions,
            database,
        }
    }

    /// JWT 中间件使用的状态：令牌校验器 + 吊销列表
    pub fn auth_state(&self) -> AuthState {
        AuthState::new(self.jwt_manager.clone(), self.database.clone() as DynSessionRepository)
    }
}
