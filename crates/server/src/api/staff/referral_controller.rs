use crate::{
    dtos::{
        common::ApiResponse,
        referral_dto::{SendInviteRequest, StaffReferralQuery},
    },
    extractors::{Actor, QueryExtractor, ValidationExtractor},
    services::Services,
};
use axum::{
    extract::Path,
    routing::{get, post},
    Extension, Json, Router,
};
use database::referral::model::{Referral, ReferralStats};
use utils::AppResult;

#[utoipa::path(
    get,
    path = "/api/v1/staff/referrals",
    tag = "staff",
    params(StaffReferralQuery),
    responses(
        (status = 200, description = "我的推荐记录", body = ApiResponse<Vec<Referral>>)
    )
)]
pub async fn my_referrals(
    Extension(services): Extension<Services>,
    actor: Actor,
    QueryExtractor(query): QueryExtractor<StaffReferralQuery>,
) -> AppResult<Json<ApiResponse<Vec<Referral>>>> {
    let referrals = services.staff.referrals(actor.staff_id()?, query).await?;

    Ok(Json(ApiResponse::success(referrals)))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/referrals/stats",
    tag = "staff",
    responses(
        (status = 200, description = "我的推荐按状态统计", body = ApiResponse<ReferralStats>)
    )
)]
pub async fn my_referral_stats(
    Extension(services): Extension<Services>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<ReferralStats>>> {
    let stats = services.staff.referral_stats(actor.staff_id()?).await?;

    Ok(Json(ApiResponse::success(stats)))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/referrals/{id}",
    tag = "staff",
    params(("id" = i64, Path, description = "推荐记录ID")),
    responses(
        (status = 200, description = "推荐记录", body = ApiResponse<Referral>),
        (status = 404, description = "不存在或不属于当前员工")
    )
)]
pub async fn my_referral(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Referral>>> {
    let referral = services.staff.referral(actor.staff_id()?, id).await?;

    Ok(Json(ApiResponse::success(referral)))
}

/// 发送推荐邀请
///
/// 为被邀请邮箱创建 pending 推荐；同一邮箱已有待处理邀请时返回 409
#[utoipa::path(
    post,
    path = "/api/v1/staff/referrals/invite",
    tag = "staff",
    request_body = SendInviteRequest,
    responses(
        (status = 200, description = "新建的推荐记录", body = ApiResponse<Referral>),
        (status = 409, description = "重复邀请")
    )
)]
pub async fn send_invite(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<SendInviteRequest>,
) -> AppResult<Json<ApiResponse<Referral>>> {
    let referral = services.staff.send_invite(actor.staff_id()?, req).await?;

    Ok(Json(ApiResponse::with_message(referral, "Invitation sent")))
}

pub struct StaffReferralController;
impl StaffReferralController {
    pub fn app() -> Router {
        Router::new()
            .route("/referrals", get(my_referrals))
            .route("/referrals/stats", get(my_referral_stats))
            .route("/referrals/invite", post(send_invite))
            .route("/referrals/:id", get(my_referral))
    }
}
