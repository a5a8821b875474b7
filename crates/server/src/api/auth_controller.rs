use crate::{
    auth::{jwt_auth_middleware, AuthState},
    dtos::{
        auth_dto::{
            AdminSummary, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse, MeResponse,
            RefreshTokenRequest, ResetPasswordRequest, StaffSummary, TokenResponse,
        },
        common::ApiResponse,
    },
    extractors::{Actor, ClientIp, ValidationExtractor},
    services::Services,
};
use axum::{
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use utils::AppResult;

/// 管理员登录
#[utoipa::path(
    post,
    path = "/api/v1/auth/login/admin",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功，返回管理员信息与令牌", body = ApiResponse<LoginResponse<AdminSummary>>),
        (status = 401, description = "邮箱或密码错误"),
        (status = 403, description = "账号已停用")
    )
)]
pub async fn admin_login(
    Extension(services): Extension<Services>,
    ClientIp(ip): ClientIp,
    ValidationExtractor(req): ValidationExtractor<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse<AdminSummary>>>> {
    let response = services.auth.admin_login(req, &ip).await?;

    Ok(Json(ApiResponse::with_message(response, "Login successful")))
}

/// 员工登录
#[utoipa::path(
    post,
    path = "/api/v1/auth/login/staff",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功，返回员工信息与令牌", body = ApiResponse<LoginResponse<StaffSummary>>),
        (status = 401, description = "邮箱或密码错误"),
        (status = 403, description = "账号未激活")
    )
)]
pub async fn staff_login(
    Extension(services): Extension<Services>,
    ValidationExtractor(req): ValidationExtractor<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse<StaffSummary>>>> {
    let response = services.auth.staff_login(req).await?;

    Ok(Json(ApiResponse::with_message(response, "Login successful")))
}

/// 刷新令牌（旧刷新令牌随即失效）
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "新的令牌对", body = ApiResponse<TokenResponse>),
        (status = 401, description = "刷新令牌无效")
    )
)]
pub async fn refresh_token(
    Extension(services): Extension<Services>,
    ValidationExtractor(req): ValidationExtractor<RefreshTokenRequest>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let tokens = services.auth.refresh_token(&req.refresh_token).await?;

    Ok(Json(ApiResponse::success(tokens)))
}

/// 申请重置密码
#[utoipa::path(
    post,
    path = "/api/v1/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "已签发重置令牌", body = ApiResponse<ForgotPasswordResponse>),
        (status = 404, description = "邮箱不存在")
    )
)]
pub async fn forgot_password(
    Extension(services): Extension<Services>,
    ValidationExtractor(req): ValidationExtractor<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<ForgotPasswordResponse>>> {
    let response = services.auth.forgot_password(&req.email).await?;

    Ok(Json(ApiResponse::with_message(
        response,
        "Password reset instructions have been sent",
    )))
}

/// 使用重置令牌设置新密码
#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "密码已重置"),
        (status = 400, description = "令牌无效或已过期")
    )
)]
pub async fn reset_password(
    Extension(services): Extension<Services>,
    ValidationExtractor(req): ValidationExtractor<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    services.auth.reset_password(req).await?;

    Ok(Json(ApiResponse::message("Password has been reset")))
}

/// 退出登录
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "令牌已吊销"),
        (status = 401, description = "未认证")
    )
)]
pub async fn logout(Extension(services): Extension<Services>, actor: Actor) -> AppResult<Json<ApiResponse<()>>> {
    services.auth.logout(&actor.user).await?;

    Ok(Json(ApiResponse::message("Logged out successfully")))
}

/// 当前登录主体
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "管理员或员工信息"),
        (status = 401, description = "未认证")
    )
)]
pub async fn me(Extension(services): Extension<Services>, actor: Actor) -> AppResult<Json<ApiResponse<MeResponse>>> {
    let me = services.auth.me(&actor.user).await?;

    Ok(Json(ApiResponse::success(me)))
}

pub struct AuthController;
impl AuthController {
    pub fn app(auth_state: AuthState) -> Router {
        let protected = Router::new()
            .route("/logout", post(logout))
            .route("/me", get(me))
            .route_layer(middleware::from_fn_with_state(auth_state, jwt_auth_middleware));

        Router::new()
            .route("/login/admin", post(admin_login))
            .route("/login/staff", post(staff_login))
            .route("/refresh", post(refresh_token))
            .route("/forgot-password", post(forgot_password))
            .route("/reset-password", post(reset_password))
            .merge(protected)
    }
}
