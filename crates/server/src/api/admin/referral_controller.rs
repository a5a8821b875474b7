use crate::{
    auth::require_permission,
    dtos::{
        common::{ApiResponse, PageData},
        referral_dto::{ReferralListQuery, UpdateReferralStatusRequest},
    },
    extractors::{Actor, QueryExtractor, ValidationExtractor},
    services::Services,
};
use axum::{
    extract::Path,
    middleware::from_fn,
    routing::{get, put},
    Extension, Json, Router,
};
use database::{
    admin::model::AdminPermission,
    referral::model::{Referral, ReferralStats},
};
use utils::AppResult;

/// 推荐记录列表
#[utoipa::path(
    get,
    path = "/api/v1/admin/referrals",
    tag = "admin-referrals",
    params(ReferralListQuery),
    responses(
        (status = 200, description = "分页的推荐记录", body = ApiResponse<PageData<Referral>>)
    )
)]
pub async fn list_referrals(
    Extension(services): Extension<Services>,
    QueryExtractor(query): QueryExtractor<ReferralListQuery>,
) -> AppResult<Json<ApiResponse<PageData<Referral>>>> {
    Ok(Json(ApiResponse::success(services.referrals.list_referrals(query).await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/referrals/stats",
    tag = "admin-referrals",
    responses(
        (status = 200, description = "按状态统计", body = ApiResponse<ReferralStats>)
    )
)]
pub async fn referral_stats(Extension(services): Extension<Services>) -> AppResult<Json<ApiResponse<ReferralStats>>> {
    Ok(Json(ApiResponse::success(services.referrals.referral_stats().await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/referrals/{id}",
    tag = "admin-referrals",
    params(("id" = i64, Path, description = "推荐记录ID")),
    responses(
        (status = 200, description = "推荐记录", body = ApiResponse<Referral>),
        (status = 404, description = "推荐记录不存在")
    )
)]
pub async fn get_referral(
    Extension(services): Extension<Services>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Referral>>> {
    Ok(Json(ApiResponse::success(services.referrals.get_referral(id).await?)))
}

/// 更新推荐状态
///
/// pending → approved | rejected，approved → completed | rejected；
/// 完成时为推荐人发放积分
#[utoipa::path(
    put,
    path = "/api/v1/admin/referrals/{id}/status",
    tag = "admin-referrals",
    params(("id" = i64, Path, description = "推荐记录ID")),
    request_body = UpdateReferralStatusRequest,
    responses(
        (status = 200, description = "更新后的推荐记录", body = ApiResponse<Referral>),
        (status = 400, description = "非法的状态流转")
    )
)]
pub async fn update_referral_status(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidationExtractor(req): ValidationExtractor<UpdateReferralStatusRequest>,
) -> AppResult<Json<ApiResponse<Referral>>> {
    let referral = services.referrals.update_status(&actor, id, req).await?;
    let message = format!("Referral {}", referral.status);

    Ok(Json(ApiResponse::with_message(referral, message)))
}

pub struct ReferralController;
impl ReferralController {
    pub fn app() -> Router {
        let read = Router::new()
            .route("/referrals", get(list_referrals))
            .route("/referrals/stats", get(referral_stats))
            .route("/referrals/:id", get(get_referral))
            .route_layer(from_fn(require_permission(AdminPermission::ViewReferrals)));

        let manage = Router::new()
            .route("/referrals/:id/status", put(update_referral_status))
            .route_layer(from_fn(require_permission(AdminPermission::ManageReferrals)));

        read.merge(manage)
    }
}
