use crate::{
    dtos::{
        common::ApiResponse,
        staff_dto::{
            AvatarRequest, AvatarResponse, HoursSyncStatus, MarkAllReadResponse, NotificationList, SupportRequestBody,
            UpdatePasswordRequest, UpdateProfileRequest,
        },
    },
    extractors::{Actor, ValidationExtractor},
    services::Services,
};
use axum::{
    extract::Path,
    routing::{get, post, put},
    Extension, Json, Router,
};
use database::{
    notification::model::Notification,
    staff::model::{StaffHours, StaffUser},
    support::model::{FaqEntry, SupportRequest},
};
use utils::AppResult;

#[utoipa::path(
    get,
    path = "/api/v1/staff/hours",
    tag = "staff",
    responses(
        (status = 200, description = "工时汇总", body = ApiResponse<StaffHours>)
    )
)]
pub async fn hours(Extension(services): Extension<Services>, actor: Actor) -> AppResult<Json<ApiResponse<StaffHours>>> {
    Ok(Json(ApiResponse::success(services.account.hours(actor.staff_id()?).await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/hours/sync-status",
    tag = "staff",
    responses(
        (status = 200, description = "工时同步状态", body = ApiResponse<HoursSyncStatus>)
    )
)]
pub async fn hours_sync_status(
    Extension(services): Extension<Services>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<HoursSyncStatus>>> {
    Ok(Json(ApiResponse::success(
        services.account.hours_sync_status(actor.staff_id()?).await?,
    )))
}

/// 通知列表（含未读数）
#[utoipa::path(
    get,
    path = "/api/v1/staff/notifications",
    tag = "staff",
    responses(
        (status = 200, description = "通知列表", body = ApiResponse<NotificationList>)
    )
)]
pub async fn notifications(
    Extension(services): Extension<Services>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<NotificationList>>> {
    Ok(Json(ApiResponse::success(
        services.account.notifications(actor.staff_id()?).await?,
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/staff/notifications/{id}/read",
    tag = "staff",
    params(("id" = i64, Path, description = "通知ID")),
    responses(
        (status = 200, description = "已读的通知", body = ApiResponse<Notification>),
        (status = 404, description = "不存在或不属于当前员工")
    )
)]
pub async fn mark_read(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    Ok(Json(ApiResponse::success(
        services.account.mark_read(actor.staff_id()?, id).await?,
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/staff/notifications/read-all",
    tag = "staff",
    responses(
        (status = 200, description = "标记为已读的数量", body = ApiResponse<MarkAllReadResponse>)
    )
)]
pub async fn mark_all_read(
    Extension(services): Extension<Services>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<MarkAllReadResponse>>> {
    Ok(Json(ApiResponse::success(
        services.account.mark_all_read(actor.staff_id()?).await?,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/profile",
    tag = "staff",
    responses(
        (status = 200, description = "个人资料", body = ApiResponse<StaffUser>)
    )
)]
pub async fn profile(Extension(services): Extension<Services>, actor: Actor) -> AppResult<Json<ApiResponse<StaffUser>>> {
    Ok(Json(ApiResponse::success(services.account.profile(actor.staff_id()?).await?)))
}

#[utoipa::path(
    put,
    path = "/api/v1/staff/profile",
    tag = "staff",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "更新后的资料", body = ApiResponse<StaffUser>)
    )
)]
pub async fn update_profile(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<StaffUser>>> {
    let user = services.account.update_profile(actor.staff_id()?, req).await?;

    Ok(Json(ApiResponse::with_message(user, "Profile updated")))
}

/// 修改密码（需校验当前密码）
#[utoipa::path(
    put,
    path = "/api/v1/staff/profile/password",
    tag = "staff",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "密码已修改"),
        (status = 400, description = "当前密码错误")
    )
)]
pub async fn update_password(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<UpdatePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    services.account.update_password(actor.staff_id()?, req).await?;

    Ok(Json(ApiResponse::message("Password updated successfully")))
}

#[utoipa::path(
    put,
    path = "/api/v1/staff/profile/avatar",
    tag = "staff",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "新的头像地址", body = ApiResponse<AvatarResponse>)
    )
)]
pub async fn update_avatar(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<AvatarRequest>,
) -> AppResult<Json<ApiResponse<AvatarResponse>>> {
    let avatar = services.account.update_avatar(actor.staff_id()?, req.avatar_url).await?;

    Ok(Json(ApiResponse::with_message(avatar, "Avatar updated")))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/help/faq",
    tag = "staff",
    responses(
        (status = 200, description = "常见问题", body = ApiResponse<Vec<FaqEntry>>)
    )
)]
pub async fn faq(Extension(services): Extension<Services>) -> AppResult<Json<ApiResponse<Vec<FaqEntry>>>> {
    Ok(Json(ApiResponse::success(services.account.faq().await?)))
}

#[utoipa::path(
    post,
    path = "/api/v1/staff/help/support",
    tag = "staff",
    request_body = SupportRequestBody,
    responses(
        (status = 200, description = "已提交的工单", body = ApiResponse<SupportRequest>)
    )
)]
pub async fn submit_support_request(
    Extension(services): Extension<Services>,
    actor: Actor,
    ValidationExtractor(req): ValidationExtractor<SupportRequestBody>,
) -> AppResult<Json<ApiResponse<SupportRequest>>> {
    let request = services
        .account
        .submit_support_request(actor.staff_id()?, req)
        .await?;

    Ok(Json(ApiResponse::with_message(
        request,
        "Support request submitted. We will get back to you shortly.",
    )))
}

pub struct StaffAccountController;
impl StaffAccountController {
    pub fn app() -> Router {
        Router::new()
            .route("/hours", get(hours))
            .route("/hours/sync-status", get(hours_sync_status))
            .route("/notifications", get(notifications))
            .route("/notifications/read-all", put(mark_all_read))
            .route("/notifications/:id/read", put(mark_read))
            .route("/profile", get(profile).put(update_profile))
            .route("/profile/password", put(update_password))
            .route("/profile/avatar", put(update_avatar))
            .route("/help/faq", get(faq))
            .route("/help/support", post(submit_support_request))
    }
}
