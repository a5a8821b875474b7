use crate::{
    auth::require_permission,
    dtos::{
        common::{ApiResponse, PageData},
        user_dto::{UpdateUserRequest, UserDetail, UserListQuery},
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
use database::{
    admin::model::AdminPermission, points::model::PointTransaction, referral::model::Referral,
    staff::model::StaffUser,
};
use tracing::debug;
use utils::AppResult;

/// 员工列表
///
/// 支持按姓名/邮箱/推荐码搜索，按部门、地点、状态筛选，排序与分页
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "admin-users",
    params(UserListQuery),
    responses(
        (status = 200, description = "分页的员工列表", body = ApiResponse<PageData<StaffUser>>),
        (status = 403, description = "缺少 view_users 权限")
    )
)]
pub async fn list_users(
    Extension(services): Extension<Services>,
    QueryExtractor(query): QueryExtractor<UserListQuery>,
) -> AppResult<Json<ApiResponse<PageData<StaffUser>>>> {
    debug!("🔍 员工列表查询: {:?}", query);
    let page = services.users.list_users(query).await?;

    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}",
    tag = "admin-users",
    params(("id" = i64, Path, description = "员工ID")),
    responses(
        (status = 200, description = "员工详情", body = ApiResponse<UserDetail>),
        (status = 404, description = "员工不存在")
    )
)]
pub async fn get_user(
    Extension(services): Extension<Services>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<UserDetail>>> {
    Ok(Json(ApiResponse::success(services.users.get_user(id).await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}/referrals",
    tag = "admin-users",
    params(("id" = i64, Path, description = "员工ID")),
    responses(
        (status = 200, description = "该员工的推荐记录", body = ApiResponse<Vec<Referral>>)
    )
)]
pub async fn user_referrals(
    Extension(services): Extension<Services>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<Referral>>>> {
    Ok(Json(ApiResponse::success(services.users.user_referrals(id).await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}/transactions",
    tag = "admin-users",
    params(("id" = i64, Path, description = "员工ID")),
    responses(
        (status = 200, description = "该员工的积分流水", body = ApiResponse<Vec<PointTransaction>>)
    )
)]
pub async fn user_transactions(
    Extension(services): Extension<Services>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<PointTransaction>>>> {
    Ok(Json(ApiResponse::success(services.users.user_transactions(id).await?)))
}

/// 部分更新员工资料
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}",
    tag = "admin-users",
    params(("id" = i64, Path, description = "员工ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "更新后的员工", body = ApiResponse<StaffUser>),
        (status = 409, description = "邮箱已被占用")
    )
)]
pub async fn update_user(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidationExtractor(req): ValidationExtractor<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<StaffUser>>> {
    let user = services.users.update_user(&actor, id, req).await?;

    Ok(Json(ApiResponse::with_message(user, "User updated successfully")))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/deactivate",
    tag = "admin-users",
    params(("id" = i64, Path, description = "员工ID")),
    responses(
        (status = 200, description = "账号已停用", body = ApiResponse<StaffUser>)
    )
)]
pub async fn deactivate_user(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<StaffUser>>> {
    let user = services.users.set_user_active(&actor, id, false).await?;

    Ok(Json(ApiResponse::with_message(user, "User deactivated")))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/activate",
    tag = "admin-users",
    params(("id" = i64, Path, description = "员工ID")),
    responses(
        (status = 200, description = "账号已启用", body = ApiResponse<StaffUser>)
    )
)]
pub async fn activate_user(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<StaffUser>>> {
    let user = services.users.set_user_active(&actor, id, true).await?;

    Ok(Json(ApiResponse::with_message(user, "User activated")))
}

/// 删除员工（存在未结提现时拒绝）
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    tag = "admin-users",
    params(("id" = i64, Path, description = "员工ID")),
    responses(
        (status = 200, description = "已删除的员工", body = ApiResponse<StaffUser>),
        (status = 409, description = "存在未结提现")
    )
)]
pub async fn delete_user(
    Extension(services): Extension<Services>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<StaffUser>>> {
    let user = services.users.delete_user(&actor, id).await?;

    Ok(Json(ApiResponse::with_message(user, "User deleted")))
}

pub struct UserController;
impl UserController {
    pub fn app() -> Router {
        Router::new()
            .route(
                "/users",
                get(list_users).route_layer(from_fn(require_permission(AdminPermission::ViewUsers))),
            )
            .route(
                "/users/:id",
                get(get_user)
                    .route_layer(from_fn(require_permission(AdminPermission::ViewUsers)))
                    .merge(put(update_user).route_layer(from_fn(require_permission(AdminPermission::EditUsers))))
                    .merge(
                        delete(delete_user).route_layer(from_fn(require_permission(AdminPermission::DeleteUsers))),
                    ),
            )
            .route(
                "/users/:id/referrals",
                get(user_referrals).route_layer(from_fn(require_permission(AdminPermission::ViewUsers))),
            )
            .route(
                "/users/:id/transactions",
                get(user_transactions).route_layer(from_fn(require_permission(AdminPermission::ViewUsers))),
            )
            .route(
                "/users/:id/deactivate",
                post(deactivate_user).route_layer(from_fn(require_permission(AdminPermission::EditUsers))),
            )
            .route(
                "/users/:id/activate",
                post(activate_user).route_layer(from_fn(require_permission(AdminPermission::EditUsers))),
            )
    }
}
