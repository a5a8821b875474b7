use crate::{
    auth::require_permission,
    dtos::{
        common::{ApiResponse, PageData},
        points_dto::{
            AdjustPointsRequest, AdjustPointsResponse, PointsConfig, PointsHistoryQuery, ScheduleRateRequest,
            TransactionListQuery, UpdateRateRequest,
        },
    },
    extractors::{Actor, QueryExtractor, ValidationExtractor},
    services::Services,
};
use axum::{
    extract::Path,
    middleware::from_fn,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use database::{admin::model::AdminPermission, points::model::PointTransaction, rate::model::ConversionRate};
use utils::AppResult;

/// 积分配置：当前汇率、提现额度、汇率历史
#[utoipa::path(
    get,
    path = "/api/v1/admin/points/config",
    tag = "admin-points",
    responses(
        (status = 200, description = "积分配置", body = ApiResponse<PointsConfig>)
    )
)]
pub async fn points_config(Extension(services): Extension<Services>) -> AppResult<Json<ApiResponse<PointsConfig>>> {
    Ok(Json(ApiResponse::success(services.points.config().await?)))
}

/// 立即生效的新汇率
#[utoipa::path(
    put,
    path = "/api/v1/admin/points/rate",
    tag = "admin-points",
    request_body = UpdateRateRequest,
    responses(
        (status = 200, description = "新的生效汇率", body = ApiResponse<ConversionRate>),
        (status = 400, description = "汇率必须大于0")
    )
)]
pub async fn update_rate(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<UpdateRateRequest>,
) -> AppResult<Json<ApiResponse<ConversionRate>>> {
    let rate = services.points.update_rate(&actor, req.rate).await?;

    Ok(Json(ApiResponse::with_message(rate, "Conversion rate updated")))
}

/// 预约未来生效的汇率
#[utoipa::path(
    post,
    path = "/api/v1/admin/points/rates/schedule",
    tag = "admin-points",
    request_body = ScheduleRateRequest,
    responses(
        (status = 200, description = "已预约的汇率", body = ApiResponse<ConversionRate>),
        (status = 400, description = "生效时间必须在未来")
    )
)]
pub async fn schedule_rate(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<ScheduleRateRequest>,
) -> AppResult<Json<ApiResponse<ConversionRate>>> {
    let rate = services.points.schedule_rate(&actor, req).await?;

    Ok(Json(ApiResponse::with_message(rate, "Rate change scheduled")))
}

/// 删除尚未生效的预约汇率
#[utoipa::path(
    delete,
    path = "/api/v1/admin/points/rates/{id}",
    tag = "admin-points",
    params(("id" = i64, Path, description = "汇率ID")),
    responses(
        (status = 200, description = "已删除的预约汇率", body = ApiResponse<ConversionRate>),
        (status = 400, description = "只能删除未生效的汇率")
    )
)]
pub async fn delete_scheduled_rate(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<ConversionRate>>> {
    let rate = services.points.delete_scheduled_rate(&actor, id).await?;

    Ok(Json(ApiResponse::with_message(rate, "Scheduled rate deleted")))
}

/// 调整员工积分（add / remove / expire / freeze / unfreeze）
#[utoipa::path(
    post,
    path = "/api/v1/admin/points/users/{id}/adjust",
    tag = "admin-points",
    params(("id" = i64, Path, description = "员工ID")),
    request_body = AdjustPointsRequest,
    responses(
        (status = 200, description = "调整后的员工与积分流水", body = ApiResponse<AdjustPointsResponse>),
        (status = 400, description = "可用积分不足")
    )
)]
pub async fn adjust_user_points(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidationExtractor(req): ValidationExtractor<AdjustPointsRequest>,
) -> AppResult<Json<ApiResponse<AdjustPointsResponse>>> {
    let response = services.points.adjust_user_points(&actor, id, req).await?;

    Ok(Json(ApiResponse::with_message(response, "Points adjusted")))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/points/history",
    tag = "admin-points",
    params(PointsHistoryQuery),
    responses(
        (status = 200, description = "积分流水（不分页）", body = ApiResponse<Vec<PointTransaction>>)
    )
)]
pub async fn points_history(
    Extension(services): Extension<Services>,
    QueryExtractor(query): QueryExtractor<PointsHistoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<PointTransaction>>>> {
    Ok(Json(ApiResponse::success(services.points.history(query).await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/points/transactions",
    tag = "admin-points",
    params(TransactionListQuery),
    responses(
        (status = 200, description = "分页的积分流水", body = ApiResponse<PageData<PointTransaction>>)
    )
)]
pub async fn transactions(
    Extension(services): Extension<Services>,
    QueryExtractor(query): QueryExtractor<TransactionListQuery>,
) -> AppResult<Json<ApiResponse<PageData<PointTransaction>>>> {
    Ok(Json(ApiResponse::success(services.points.transactions(query).await?)))
}

pub struct PointsController;
impl PointsController {
    pub fn app() -> Router {
        let read = Router::new()
            .route("/points/config", get(points_config))
            .route("/points/history", get(points_history))
            .route("/points/transactions", get(transactions));

        let rates = Router::new()
            .route("/points/rate", put(update_rate))
            .route("/points/rates/schedule", post(schedule_rate))
            .route("/points/rates/:id", delete(delete_scheduled_rate))
            .route_layer(from_fn(require_permission(AdminPermission::ManageRates)));

        let adjust = Router::new()
            .route("/points/users/:id/adjust", post(adjust_user_points))
            .route_layer(from_fn(require_permission(AdminPermission::AdjustPoints)));

        read.merge(rates).merge(adjust)
    }
}
