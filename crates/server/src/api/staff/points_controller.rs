use crate::{
    dtos::{
        common::ApiResponse,
        staff_dto::{ConversionRateInfo, PointsBalance, StaffPointsQuery},
    },
    extractors::{Actor, QueryExtractor},
    services::Services,
};
use axum::{routing::get, Extension, Json, Router};
use database::points::model::PointTransaction;
use utils::AppResult;

/// 积分余额：总额、冻结、可用及折算现金
#[utoipa::path(
    get,
    path = "/api/v1/staff/points/balance",
    tag = "staff",
    responses(
        (status = 200, description = "积分余额", body = ApiResponse<PointsBalance>)
    )
)]
pub async fn balance(
    Extension(services): Extension<Services>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<PointsBalance>>> {
    Ok(Json(ApiResponse::success(
        services.staff.points_balance(actor.staff_id()?).await?,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/points/history",
    tag = "staff",
    params(StaffPointsQuery),
    responses(
        (status = 200, description = "积分流水", body = ApiResponse<Vec<PointTransaction>>)
    )
)]
pub async fn history(
    Extension(services): Extension<Services>,
    actor: Actor,
    QueryExtractor(query): QueryExtractor<StaffPointsQuery>,
) -> AppResult<Json<ApiResponse<Vec<PointTransaction>>>> {
    let history = services.staff.points_history(actor.staff_id()?, query.kind).await?;

    Ok(Json(ApiResponse::success(history)))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/points/conversion-rate",
    tag = "staff",
    responses(
        (status = 200, description = "当前兑换汇率", body = ApiResponse<ConversionRateInfo>)
    )
)]
pub async fn conversion_rate(
    Extension(services): Extension<Services>,
) -> AppResult<Json<ApiResponse<ConversionRateInfo>>> {
    Ok(Json(ApiResponse::success(services.staff.conversion_rate().await?)))
}

pub struct StaffPointsController;
impl StaffPointsController {
    pub fn app() -> Router {
        Router::new()
            .route("/points/balance", get(balance))
            .route("/points/history", get(history))
            .route("/points/conversion-rate", get(conversion_rate))
    }
}
