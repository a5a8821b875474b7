use crate::{
    auth::{require_permission, require_super_admin},
    dtos::{
        auth_dto::AdminSummary,
        common::ApiResponse,
        settings_dto::{
            CreateAdminRequest, OverrideRequest, OverrideResponse, UpdateAdminRequest, UpdateCurrencyRequest,
            UpdateFeaturesRequest, UpdateRetentionRequest, UpdateTimezoneRequest, UpdateWithdrawalLimitsRequest,
        },
    },
    extractors::{Actor, ValidationExtractor},
    services::Services,
};
use axum::{
    extract::Path,
    middleware::from_fn,
    routing::{get, post, put},
    Extension, Json, Router,
};
use database::{admin::model::AdminPermission, overrides::model::OverrideRecord, settings::model::SystemSettings};
use utils::AppResult;

#[utoipa::path(
    get,
    path = "/api/v1/admin/settings",
    tag = "admin-settings",
    responses(
        (status = 200, description = "系统设置", body = ApiResponse<SystemSettings>)
    )
)]
pub async fn get_settings(Extension(services): Extension<Services>) -> AppResult<Json<ApiResponse<SystemSettings>>> {
    Ok(Json(ApiResponse::success(services.settings.get_settings().await?)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/settings/timezone",
    tag = "admin-settings",
    request_body = UpdateTimezoneRequest,
    responses(
        (status = 200, description = "更新后的设置", body = ApiResponse<SystemSettings>)
    )
)]
pub async fn update_timezone(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<UpdateTimezoneRequest>,
) -> AppResult<Json<ApiResponse<SystemSettings>>> {
    let settings = services.settings.update_timezone(&actor, req.timezone).await?;

    Ok(Json(ApiResponse::with_message(settings, "Timezone updated")))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/settings/currency",
    tag = "admin-settings",
    request_body = UpdateCurrencyRequest,
    responses(
        (status = 200, description = "更新后的设置", body = ApiResponse<SystemSettings>)
    )
)]
pub async fn update_currency(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<UpdateCurrencyRequest>,
) -> AppResult<Json<ApiResponse<SystemSettings>>> {
    let settings = services.settings.update_currency(&actor, req.currency).await?;

    Ok(Json(ApiResponse::with_message(settings, "Currency updated")))
}

/// 功能开关（部分合并）
#[utoipa::path(
    put,
    path = "/api/v1/admin/settings/features",
    tag = "admin-settings",
    request_body = UpdateFeaturesRequest,
    responses(
        (status = 200, description = "更新后的设置", body = ApiResponse<SystemSettings>)
    )
)]
pub async fn update_features(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<UpdateFeaturesRequest>,
) -> AppResult<Json<ApiResponse<SystemSettings>>> {
    let settings = services.settings.update_features(&actor, req).await?;

    Ok(Json(ApiResponse::with_message(settings, "Features updated")))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/settings/retention",
    tag = "admin-settings",
    request_body = UpdateRetentionRequest,
    responses(
        (status = 200, description = "更新后的设置", body = ApiResponse<SystemSettings>),
        (status = 400, description = "保留天数需在 1..=3650")
    )
)]
pub async fn update_retention(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<UpdateRetentionRequest>,
) -> AppResult<Json<ApiResponse<SystemSettings>>> {
    let settings = services.settings.update_retention(&actor, req.days).await?;

    Ok(Json(ApiResponse::with_message(settings, "Data retention updated")))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/settings/withdrawal-limits",
    tag = "admin-settings",
    request_body = UpdateWithdrawalLimitsRequest,
    responses(
        (status = 200, description = "更新后的设置", body = ApiResponse<SystemSettings>),
        (status = 400, description = "最小值必须小于最大值")
    )
)]
pub async fn update_withdrawal_limits(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<UpdateWithdrawalLimitsRequest>,
) -> AppResult<Json<ApiResponse<SystemSettings>>> {
    let settings = services.settings.update_withdrawal_limits(&actor, req).await?;

    Ok(Json(ApiResponse::with_message(settings, "Withdrawal limits updated")))
}

/// 超级管理员越权操作
///
/// 绕过状态流转表，必须给出不少于20字符的原因
#[utoipa::path(
    post,
    path = "/api/v1/admin/override",
    tag = "admin-settings",
    request_body = OverrideRequest,
    responses(
        (status = 200, description = "操作结果与记录", body = ApiResponse<OverrideResponse>),
        (status = 403, description = "需要超级管理员")
    )
)]
pub async fn perform_override(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<OverrideRequest>,
) -> AppResult<Json<ApiResponse<OverrideResponse>>> {
    let response = services.settings.perform_override(&actor, req).await?;

    Ok(Json(ApiResponse::with_message(response, "Override action completed")))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/overrides",
    tag = "admin-settings",
    responses(
        (status = 200, description = "越权操作记录", body = ApiResponse<Vec<OverrideRecord>>)
    )
)]
pub async fn list_overrides(
    Extension(services): Extension<Services>,
) -> AppResult<Json<ApiResponse<Vec<OverrideRecord>>>> {
    Ok(Json(ApiResponse::success(services.settings.list_overrides().await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/admins",
    tag = "admin-settings",
    responses(
        (status = 200, description = "管理员账号列表", body = ApiResponse<Vec<AdminSummary>>)
    )
)]
pub async fn list_admins(Extension(services): Extension<Services>) -> AppResult<Json<ApiResponse<Vec<AdminSummary>>>> {
    Ok(Json(ApiResponse::success(services.settings.list_admins().await?)))
}

/// 新建管理员（未指定权限时使用角色默认权限）
#[utoipa::path(
    post,
    path = "/api/v1/admin/admins",
    tag = "admin-settings",
    request_body = CreateAdminRequest,
    responses(
        (status = 200, description = "新建的管理员", body = ApiResponse<AdminSummary>),
        (status = 409, description = "邮箱已存在")
    )
)]
pub async fn create_admin(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<CreateAdminRequest>,
) -> AppResult<Json<ApiResponse<AdminSummary>>> {
    let admin = services.settings.create_admin(&actor, req).await?;

    Ok(Json(ApiResponse::with_message(admin, "Admin account created")))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/admins/{id}",
    tag = "admin-settings",
    params(("id" = String, Path, description = "管理员ID，如 admin-2")),
    request_body = UpdateAdminRequest,
    responses(
        (status = 200, description = "更新后的管理员", body = ApiResponse<AdminSummary>)
    )
)]
pub async fn update_admin(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<String>,
    ValidationExtractor(req): ValidationExtractor<UpdateAdminRequest>,
) -> AppResult<Json<ApiResponse<AdminSummary>>> {
    let admin = services.settings.update_admin(&actor, &id, req).await?;

    Ok(Json(ApiResponse::with_message(admin, "Admin account updated")))
}

pub struct SettingsController;
impl SettingsController {
    pub fn app() -> Router {
        let settings = Router::new()
            .route("/settings", get(get_settings))
            .route("/settings/timezone", put(update_timezone))
            .route("/settings/currency", put(update_currency))
            .route("/settings/features", put(update_features))
            .route("/settings/retention", put(update_retention))
            .route("/settings/withdrawal-limits", put(update_withdrawal_limits))
            .route_layer(from_fn(require_permission(AdminPermission::ManageSettings)));

        let super_admin = Router::new()
            .route("/override", post(perform_override))
            .route("/overrides", get(list_overrides))
            .route("/admins/:id", put(update_admin))
            .route_layer(from_fn(require_super_admin));

        let admins = Router::new().route(
            "/admins",
            get(list_admins)
                .route_layer(from_fn(require_permission(AdminPermission::ManageSettings)))
                .merge(post(create_admin).route_layer(from_fn(require_super_admin))),
        );

        settings.merge(super_admin).merge(admins)
    }
}
