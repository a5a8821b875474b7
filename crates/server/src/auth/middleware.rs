use crate::auth::{AuthUser, JwtManager, TokenExtractor, TokenKind};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use database::{admin::model::AdminPermission, session::repository::DynSessionRepository};
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::warn;
use utils::{AppError, AppResult};

/// 认证中间件状态
#[derive(Clone)]
pub struct AuthState {
    pub jwt_manager: Arc<JwtManager>,
    pub sessions: DynSessionRepository,
}

impl AuthState {
    pub fn new(jwt_manager: Arc<JwtManager>, sessions: DynSessionRepository) -> Self {
        Self { jwt_manager, sessions }
    }

    /// 校验访问令牌并检查吊销列表
    pub async fn authenticate(&self, token: &str) -> AppResult<AuthUser> {
        let claims = self
            .jwt_manager
            .verify_token_of(token, TokenKind::Access)
            .map_err(|e| {
                warn!("Token verification failed: {}", e);
                AppError::Unauthorized("Invalid or expired token".to_string())
            })?;

        if self.sessions.is_token_revoked(&claims.jti).await? {
            warn!("Revoked token presented for {}", claims.sub);
            return Err(AppError::Unauthorized("Invalid or expired token".to_string()));
        }

        Ok(AuthUser::from_claims(&claims))
    }
}

/// JWT认证中间件
pub async fn jwt_auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = TokenExtractor::extract_bearer_token(
        request
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    );

    let Some(token) = token else {
        warn!("No authentication token provided");
        return Err(AppError::Unauthorized("Authentication required".to_string()));
    };

    let auth_user = auth_state.authenticate(&token).await?;

    // 将认证用户信息添加到请求扩展中
    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

fn auth_user(request: &Request) -> Result<&AuthUser, AppError> {
    request.extensions().get::<AuthUser>().ok_or_else(|| {
        warn!("No authenticated user found for access check");
        AppError::Unauthorized("Authentication required".to_string())
    })
}

/// 仅允许管理员令牌
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    if !auth_user(&request)?.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(next.run(request).await)
}

/// 仅允许员工令牌
pub async fn require_staff(request: Request, next: Next) -> Result<Response, AppError> {
    if !auth_user(&request)?.is_staff() {
        return Err(AppError::Forbidden("Staff access required".to_string()));
    }
    Ok(next.run(request).await)
}

/// 仅允许超级管理员
pub async fn require_super_admin(request: Request, next: Next) -> Result<Response, AppError> {
    if !auth_user(&request)?.is_super_admin() {
        return Err(AppError::Forbidden("Super admin access required".to_string()));
    }
    Ok(next.run(request).await)
}

/// 权限检查中间件
pub fn require_permission(
    required_permission: AdminPermission,
) -> impl Fn(Request, Next) -> BoxFuture<'static, Result<Response, AppError>> + Clone {
    move |request: Request, next: Next| {
        Box::pin(async move {
            let user = auth_user(&request)?;
            if !user.has_permission(required_permission) {
                warn!(
                    "User {} lacks required permission: {}",
                    user.subject,
                    required_permission.as_str()
                );
                return Err(AppError::Forbidden(format!(
                    "Missing permission: {}",
                    required_permission.as_str()
                )));
            }
            Ok(next.run(request).await)
        })
    }
}
