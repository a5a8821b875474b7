use crate::{
    dtos::{
        common::ApiResponse,
        withdrawal_dto::{CreateWithdrawalRequest, StaffWithdrawalQuery, WithdrawalLimits},
    },
    extractors::{Actor, QueryExtractor, ValidationExtractor},
    services::Services,
};
use axum::{
    extract::Path,
    routing::{get, post},
    Extension, Json, Router,
};
use database::withdrawal::model::Withdrawal;
use utils::AppResult;

#[utoipa::path(
    get,
    path = "/api/v1/staff/withdrawals",
    tag = "staff",
    params(StaffWithdrawalQuery),
    responses(
        (status = 200, description = "我的提现记录", body = ApiResponse<Vec<Withdrawal>>)
    )
)]
pub async fn my_withdrawals(
    Extension(services): Extension<Services>,
    actor: Actor,
    QueryExtractor(query): QueryExtractor<StaffWithdrawalQuery>,
) -> AppResult<Json<ApiResponse<Vec<Withdrawal>>>> {
    let withdrawals = services.staff.withdrawals(actor.staff_id()?, query).await?;

    Ok(Json(ApiResponse::success(withdrawals)))
}

/// 申请提现
///
/// 金额按当前汇率折算积分（向上取整）并立即预留，汇率随申请锁定
#[utoipa::path(
    post,
    path = "/api/v1/staff/withdrawals",
    tag = "staff",
    request_body = CreateWithdrawalRequest,
    responses(
        (status = 200, description = "新建的提现申请", body = ApiResponse<Withdrawal>),
        (status = 400, description = "积分不足或超出额度"),
        (status = 403, description = "账号未激活或提现功能关闭")
    )
)]
pub async fn create_withdrawal(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<CreateWithdrawalRequest>,
) -> AppResult<Json<ApiResponse<Withdrawal>>> {
    let withdrawal = services.staff.create_withdrawal(actor.staff_id()?, req).await?;

    Ok(Json(ApiResponse::with_message(
        withdrawal,
        "Withdrawal request submitted",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/withdrawals/limits",
    tag = "staff",
    responses(
        (status = 200, description = "提现额度", body = ApiResponse<WithdrawalLimits>)
    )
)]
pub async fn withdrawal_limits(
    Extension(services): Extension<Services>,
) -> AppResult<Json<ApiResponse<WithdrawalLimits>>> {
    Ok(Json(ApiResponse::success(services.staff.withdrawal_limits().await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/withdrawals/{id}",
    tag = "staff",
    params(("id" = i64, Path, description = "提现ID")),
    responses(
        (status = 200, description = "提现详情", body = ApiResponse<Withdrawal>),
        (status = 404, description = "不存在或不属于当前员工")
    )
)]
pub async fn my_withdrawal(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Withdrawal>>> {
    let withdrawal = services.staff.withdrawal(actor.staff_id()?, id).await?;

    Ok(Json(ApiResponse::success(withdrawal)))
}

/// 取消待审核的提现并退还积分
#[utoipa::path(
    post,
    path = "/api/v1/staff/withdrawals/{id}/cancel",
    tag = "staff",
    params(("id" = i64, Path, description = "提现ID")),
    responses(
        (status = 200, description = "已取消的提现", body = ApiResponse<Withdrawal>),
        (status = 400, description = "只能取消待审核的提现")
    )
)]
pub async fn cancel_withdrawal(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Withdrawal>>> {
    let withdrawal = services.staff.cancel_withdrawal(actor.staff_id()?, id).await?;

    Ok(Json(ApiResponse::with_message(withdrawal, "Withdrawal cancelled")))
}

pub struct StaffWithdrawalController;
impl StaffWithdrawalController {
    pub fn app() -> Router {
        Router::new()
            .route("/withdrawals", get(my_withdrawals).post(create_withdrawal))
            .route("/withdrawals/limits", get(withdrawal_limits))
            .route("/withdrawals/:id", get(my_withdrawal))
            .route("/withdrawals/:id/cancel", post(cancel_withdrawal))
    }
}
