use crate::{
    auth::require_permission,
    dtos::{
        common::{ApiResponse, CountData, PageData},
        withdrawal_dto::{ExportWithdrawalsRequest, RejectWithdrawalRequest, WithdrawalListQuery, WithdrawalView},
    },
    extractors::{Actor, QueryExtractor, ValidationExtractor},
    services::Services,
};
use axum::{
    extract::Path,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    middleware::from_fn,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use database::{admin::model::AdminPermission, withdrawal::model::Withdrawal};
use utils::AppResult;

/// 提现列表
///
/// 每条记录附带按当前汇率计算的 rate_difference
#[utoipa::path(
    get,
    path = "/api/v1/admin/withdrawals",
    tag = "admin-withdrawals",
    params(WithdrawalListQuery),
    responses(
        (status = 200, description = "分页的提现记录", body = ApiResponse<PageData<WithdrawalView>>)
    )
)]
pub async fn list_withdrawals(
    Extension(services): Extension<Services>,
    QueryExtractor(query): QueryExtractor<WithdrawalListQuery>,
) -> AppResult<Json<ApiResponse<PageData<WithdrawalView>>>> {
    Ok(Json(ApiResponse::success(services.withdrawals.list_withdrawals(query).await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/withdrawals/pending-count",
    tag = "admin-withdrawals",
    responses(
        (status = 200, description = "待审核数量", body = ApiResponse<CountData>)
    )
)]
pub async fn pending_count(Extension(services): Extension<Services>) -> AppResult<Json<ApiResponse<CountData>>> {
    let count = services.withdrawals.pending_count().await? as usize;

    Ok(Json(ApiResponse::success(CountData { count })))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/withdrawals/{id}",
    tag = "admin-withdrawals",
    params(("id" = i64, Path, description = "提现ID")),
    responses(
        (status = 200, description = "提现详情", body = ApiResponse<WithdrawalView>),
        (status = 404, description = "提现不存在")
    )
)]
pub async fn get_withdrawal(
    Extension(services): Extension<Services>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<WithdrawalView>>> {
    Ok(Json(ApiResponse::success(services.withdrawals.get_withdrawal(id).await?)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/withdrawals/{id}/approve",
    tag = "admin-withdrawals",
    params(("id" = i64, Path, description = "提现ID")),
    responses(
        (status = 200, description = "已批准", body = ApiResponse<Withdrawal>),
        (status = 400, description = "当前状态不可批准")
    )
)]
pub async fn approve_withdrawal(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Withdrawal>>> {
    let withdrawal = services.withdrawals.approve(&actor, id).await?;

    Ok(Json(ApiResponse::with_message(withdrawal, "Withdrawal approved")))
}

/// 拒绝提现并退还预留积分
#[utoipa::path(
    post,
    path = "/api/v1/admin/withdrawals/{id}/reject",
    tag = "admin-withdrawals",
    params(("id" = i64, Path, description = "提现ID")),
    request_body = RejectWithdrawalRequest,
    responses(
        (status = 200, description = "已拒绝", body = ApiResponse<Withdrawal>),
        (status = 400, description = "缺少拒绝原因或状态不可拒绝")
    )
)]
pub async fn reject_withdrawal(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidationExtractor(req): ValidationExtractor<RejectWithdrawalRequest>,
) -> AppResult<Json<ApiResponse<Withdrawal>>> {
    let withdrawal = services.withdrawals.reject(&actor, id, req.reason).await?;

    Ok(Json(ApiResponse::with_message(withdrawal, "Withdrawal rejected")))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/withdrawals/{id}/process",
    tag = "admin-withdrawals",
    params(("id" = i64, Path, description = "提现ID")),
    responses(
        (status = 200, description = "已进入打款流程", body = ApiResponse<Withdrawal>)
    )
)]
pub async fn process_withdrawal(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Withdrawal>>> {
    let withdrawal = services.withdrawals.process(&actor, id).await?;

    Ok(Json(ApiResponse::with_message(withdrawal, "Withdrawal is being processed")))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/withdrawals/{id}/complete",
    tag = "admin-withdrawals",
    params(("id" = i64, Path, description = "提现ID")),
    responses(
        (status = 200, description = "已打款", body = ApiResponse<Withdrawal>)
    )
)]
pub async fn complete_withdrawal(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Withdrawal>>> {
    let withdrawal = services.withdrawals.complete(&actor, id).await?;

    Ok(Json(ApiResponse::with_message(withdrawal, "Withdrawal marked as paid")))
}

/// 导出选中的提现（CSV / 银行文本 / ABA）
#[utoipa::path(
    post,
    path = "/api/v1/admin/withdrawals/export",
    tag = "admin-withdrawals",
    request_body = ExportWithdrawalsRequest,
    responses(
        (status = 200, description = "导出文件", body = String, content_type = "text/plain"),
        (status = 404, description = "存在不存在的提现ID")
    )
)]
pub async fn export_withdrawals(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<ExportWithdrawalsRequest>,
) -> AppResult<impl IntoResponse> {
    let file = services.withdrawals.export(&actor, req).await?;

    Ok((
        [
            (CONTENT_TYPE, file.content_type.to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file.filename)),
        ],
        file.body,
    ))
}

pub struct WithdrawalController;
impl WithdrawalController {
    pub fn app() -> Router {
        let read = Router::new()
            .route("/withdrawals", get(list_withdrawals))
            .route("/withdrawals/pending-count", get(pending_count))
            .route("/withdrawals/:id", get(get_withdrawal))
            .route_layer(from_fn(require_permission(AdminPermission::ViewWithdrawals)));

        let approve = Router::new()
            .route("/withdrawals/:id/approve", post(approve_withdrawal))
            .route("/withdrawals/:id/reject", post(reject_withdrawal))
            .route("/withdrawals/:id/process", post(process_withdrawal))
            .route("/withdrawals/:id/complete", post(complete_withdrawal))
            .route_layer(from_fn(require_permission(AdminPermission::ApproveWithdrawals)));

        let export = Router::new()
            .route("/withdrawals/export", post(export_withdrawals))
            .route_layer(from_fn(require_permission(AdminPermission::ExportData)));

        read.merge(approve).merge(export)
    }
}
