use crate::{
    dtos::{
        common::ApiResponse,
        staff_dto::{ReferralCodeResponse, StaffDashboard},
    },
    extractors::Actor,
    services::Services,
};
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use utils::AppResult;

/// 员工首页：个人摘要、统计、最近5条推荐与积分流水
#[utoipa::path(
    get,
    path = "/api/v1/staff/dashboard",
    tag = "staff",
    responses(
        (status = 200, description = "员工首页数据", body = ApiResponse<StaffDashboard>),
        (status = 403, description = "需要员工令牌")
    )
)]
pub async fn dashboard(
    Extension(services): Extension<Services>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<StaffDashboard>>> {
    let dashboard = services.staff.dashboard(actor.staff_id()?).await?;

    Ok(Json(ApiResponse::success(dashboard)))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/referral-code",
    tag = "staff",
    responses(
        (status = 200, description = "当前推荐码", body = ApiResponse<ReferralCodeResponse>)
    )
)]
pub async fn referral_code(
    Extension(services): Extension<Services>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<ReferralCodeResponse>>> {
    let code = services.staff.referral_code(actor.staff_id()?).await?;

    Ok(Json(ApiResponse::success(code)))
}

/// 重新生成推荐码（REF + 6位字母数字，全局唯一）
#[utoipa::path(
    post,
    path = "/api/v1/staff/referral-code/regenerate",
    tag = "staff",
    responses(
        (status = 200, description = "新的推荐码", body = ApiResponse<ReferralCodeResponse>)
    )
)]
pub async fn regenerate_referral_code(
    Extension(services): Extension<Services>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<ReferralCodeResponse>>> {
    let code = services.staff.regenerate_referral_code(actor.staff_id()?).await?;

    Ok(Json(ApiResponse::with_message(code, "Referral code regenerated")))
}

pub struct StaffDashboardController;
impl StaffDashboardController {
    pub fn app() -> Router {
        Router::new()
            .route("/dashboard", get(dashboard))
            .route("/referral-code", get(referral_code))
            .route("/referral-code/regenerate", post(regenerate_referral_code))
    }
}
