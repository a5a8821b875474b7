use crate::{
    auth::require_permission,
    dtos::{
        audit_dto::{AuditListQuery, CreateAuditLogRequest, CreateReportRequest, ReportListQuery, ScheduleReportRequest},
        common::{ApiResponse, PageData},
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
use database::{admin::model::AdminPermission, audit::model::AuditLog, report::model::Report};
use utils::AppResult;

/// 审计日志列表（按操作名子串、管理员筛选）
#[utoipa::path(
    get,
    path = "/api/v1/admin/audit-logs",
    tag = "admin-audit",
    params(AuditListQuery),
    responses(
        (status = 200, description = "分页的审计日志", body = ApiResponse<PageData<AuditLog>>)
    )
)]
pub async fn list_audit_logs(
    Extension(services): Extension<Services>,
    QueryExtractor(query): QueryExtractor<AuditListQuery>,
) -> AppResult<Json<ApiResponse<PageData<AuditLog>>>> {
    Ok(Json(ApiResponse::success(services.audit.list_audit_logs(query).await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/audit-logs/{id}",
    tag = "admin-audit",
    params(("id" = i64, Path, description = "审计日志ID")),
    responses(
        (status = 200, description = "审计日志", body = ApiResponse<AuditLog>),
        (status = 404, description = "不存在")
    )
)]
pub async fn get_audit_log(
    Extension(services): Extension<Services>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<AuditLog>>> {
    Ok(Json(ApiResponse::success(services.audit.get_audit_log(id).await?)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/audit-logs",
    tag = "admin-audit",
    request_body = CreateAuditLogRequest,
    responses(
        (status = 200, description = "新建的审计日志", body = ApiResponse<AuditLog>)
    )
)]
pub async fn create_audit_log(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<CreateAuditLogRequest>,
) -> AppResult<Json<ApiResponse<AuditLog>>> {
    Ok(Json(ApiResponse::success(services.audit.create_audit_log(&actor, req).await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/reports",
    tag = "admin-reports",
    params(ReportListQuery),
    responses(
        (status = 200, description = "报表列表", body = ApiResponse<Vec<Report>>)
    )
)]
pub async fn list_reports(
    Extension(services): Extension<Services>,
    QueryExtractor(query): QueryExtractor<ReportListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Report>>>> {
    Ok(Json(ApiResponse::success(services.audit.list_reports(query).await?)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/reports",
    tag = "admin-reports",
    request_body = CreateReportRequest,
    responses(
        (status = 200, description = "新建的报表", body = ApiResponse<Report>)
    )
)]
pub async fn create_report(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<CreateReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let report = services.audit.create_report(&actor, req).await?;

    Ok(Json(ApiResponse::with_message(report, "Report created")))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/reports/{id}",
    tag = "admin-reports",
    params(("id" = i64, Path, description = "报表ID")),
    responses(
        (status = 200, description = "报表", body = ApiResponse<Report>),
        (status = 404, description = "不存在")
    )
)]
pub async fn get_report(
    Extension(services): Extension<Services>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Report>>> {
    Ok(Json(ApiResponse::success(services.audit.get_report(id).await?)))
}

/// 设置报表周期并计算下次运行时间
#[utoipa::path(
    put,
    path = "/api/v1/admin/reports/{id}/schedule",
    tag = "admin-reports",
    params(("id" = i64, Path, description = "报表ID")),
    request_body = ScheduleReportRequest,
    responses(
        (status = 200, description = "更新后的报表", body = ApiResponse<Report>)
    )
)]
pub async fn schedule_report(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidationExtractor(req): ValidationExtractor<ScheduleReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let report = services.audit.schedule_report(&actor, id, req.schedule).await?;

    Ok(Json(ApiResponse::with_message(report, "Report scheduled")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/reports/{id}",
    tag = "admin-reports",
    params(("id" = i64, Path, description = "报表ID")),
    responses(
        (status = 200, description = "已删除的报表", body = ApiResponse<Report>)
    )
)]
pub async fn delete_report(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let report = services.audit.delete_report(&actor, id).await?;

    Ok(Json(ApiResponse::with_message(report, "Report deleted")))
}

pub struct AuditController;
impl AuditController {
    pub fn app() -> Router {
        let audit = Router::new()
            .route("/audit-logs", get(list_audit_logs).post(create_audit_log))
            .route("/audit-logs/:id", get(get_audit_log))
            .route_layer(from_fn(require_permission(AdminPermission::ViewAuditLogs)));

        let reports = Router::new()
            .route("/reports", get(list_reports).post(create_report))
            .route("/reports/:id", get(get_report).delete(delete_report))
            .route("/reports/:id/schedule", put(schedule_report))
            .route_layer(from_fn(require_permission(AdminPermission::AccessReports)));

        audit.merge(reports)
    }
}
