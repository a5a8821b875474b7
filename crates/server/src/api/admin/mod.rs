pub mod audit_controller;
pub mod dashboard_controller;
pub mod points_controller;
pub mod referral_controller;
pub mod settings_controller;
pub mod user_controller;
pub mod withdrawal_controller;

use crate::auth::{jwt_auth_middleware, require_admin, AuthState};
use axum::{middleware, Router};

/// 管理端路由
///
/// 中间件自外向内：JWT 认证 → 管理员身份 → 各路由的权限检查
pub struct AdminController;

impl AdminController {
    pub fn app(auth_state: AuthState) -> Router {
        Router::new()
            .merge(dashboard_controller::DashboardController::app())
            .merge(user_controller::UserController::app())
            .merge(referral_controller::ReferralController::app())
            .merge(withdrawal_controller::WithdrawalController::app())
            .merge(points_controller::PointsController::app())
            .merge(audit_controller::AuditController::app())
            .merge(settings_controller::SettingsController::app())
            .route_layer(middleware::from_fn(require_admin))
            .route_layer(middleware::from_fn_with_state(auth_state, jwt_auth_middleware))
    }
}
