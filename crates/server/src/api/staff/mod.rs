pub mod account_controller;
pub mod dashboard_controller;
pub mod points_controller;
pub mod referral_controller;
pub mod withdrawal_controller;

use crate::auth::{jwt_auth_middleware, require_staff, AuthState};
use axum::{middleware, Router};

/// 员工端路由，员工ID取自令牌
pub struct StaffController;

impl StaffController {
    pub fn app(auth_state: AuthState) -> Router {
        Router::new()
            .merge(dashboard_controller::StaffDashboardController::app())
            .merge(referral_controller::StaffReferralController::app())
            .merge(points_controller::StaffPointsController::app())
            .merge(withdrawal_controller::StaffWithdrawalController::app())
            .merge(account_controller::StaffAccountController::app())
            .route_layer(middleware::from_fn(require_staff))
            .route_layer(middleware::from_fn_with_state(auth_state, jwt_auth_middleware))
    }
}
