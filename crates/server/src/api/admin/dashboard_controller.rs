use crate::{
    dtos::{
        common::ApiResponse,
        dashboard_dto::{ActivityItem, DashboardAlert, DashboardCharts, DashboardStats},
    },
    services::Services,
};
use axum::{routing::get, Extension, Json, Router};
use utils::AppResult;

/// 仪表盘统计（实时计算）
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard/stats",
    tag = "admin-dashboard",
    responses(
        (status = 200, description = "用户、推荐、提现、积分汇总", body = ApiResponse<DashboardStats>)
    )
)]
pub async fn stats(Extension(services): Extension<Services>) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    Ok(Json(ApiResponse::success(services.dashboard.stats().await?)))
}

/// 近12个月趋势、Top10、部门分布
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard/charts",
    tag = "admin-dashboard",
    responses(
        (status = 200, description = "图表数据", body = ApiResponse<DashboardCharts>)
    )
)]
pub async fn charts(Extension(services): Extension<Services>) -> AppResult<Json<ApiResponse<DashboardCharts>>> {
    Ok(Json(ApiResponse::success(services.dashboard.charts().await?)))
}

/// 最近10条推荐/提现动态
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard/recent",
    tag = "admin-dashboard",
    responses(
        (status = 200, description = "最近动态", body = ApiResponse<Vec<ActivityItem>>)
    )
)]
pub async fn recent(Extension(services): Extension<Services>) -> AppResult<Json<ApiResponse<Vec<ActivityItem>>>> {
    Ok(Json(ApiResponse::success(services.dashboard.recent().await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard/alerts",
    tag = "admin-dashboard",
    responses(
        (status = 200, description = "待处理事项提醒", body = ApiResponse<Vec<DashboardAlert>>)
    )
)]
pub async fn alerts(Extension(services): Extension<Services>) -> AppResult<Json<ApiResponse<Vec<DashboardAlert>>>> {
    Ok(Json(ApiResponse::success(services.dashboard.alerts().await?)))
}

pub struct DashboardController;
impl DashboardController {
    pub fn app() -> Router {
        Router::new()
            .route("/dashboard/stats", get(stats))
            .route("/dashboard/charts", get(charts))
            .route("/dashboard/recent", get(recent))
            .route("/dashboard/alerts", get(alerts))
    }
}
