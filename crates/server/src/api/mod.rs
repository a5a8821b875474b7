pub mod admin;
pub mod auth_controller;
pub mod staff;

use crate::auth::AuthState;
use axum::routing::{get, Router};

/// 系统健康检查
///
/// 返回服务器运行状态
///
/// # 响应
///
/// 返回简单的状态消息字符串
#[utoipa::path(
    get,
    path = "/api/v1/",
    responses(
        (status = 200, description = "服务器运行正常", body = String)
    ),
    tag = "系统状态"
)]
pub async fn health() -> &'static str {
    "Server is running! 🚀"
}

pub fn app(auth_state: AuthState) -> Router {
    Router::new()
        .route("/", get(health))
        .nest("/auth", auth_controller::AuthController::app(auth_state.clone()))
        .nest("/admin", admin::AdminController::app(auth_state.clone()))
        .nest("/staff", staff::StaffController::app(auth_state))
}
