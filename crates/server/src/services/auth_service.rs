use crate::{
    auth::{expiry_to_datetime, AuthUser, JwtManager, PermissionManager, PrincipalKind, TokenKind, TokenSubject},
    dtos::auth_dto::{
        AdminSummary, ForgotPasswordResponse, LoginRequest, LoginResponse, MeResponse, ResetPasswordRequest,
        StaffSummary, TokenResponse,
    },
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use database::{
    admin::{model::AdminUser, repository::AdminRepositoryTrait},
    audit::{model::NewAuditLog, repository::AuditRepositoryTrait},
    session::{
        model::{RefreshSession, ResetToken},
        repository::SessionRepositoryTrait,
    },
    staff::{model::StaffUser, repository::StaffRepositoryTrait},
    Database,
};
use std::sync::Arc;
use tracing::{info, warn};
use utils::{AppConfig, AppError, AppResult, PasswordHasher};
use uuid::Uuid;

pub type DynAuthService = Arc<dyn AuthServiceTrait + Send + Sync>;

#[async_trait]
pub trait AuthServiceTrait {
    async fn admin_login(&self, request: LoginRequest, ip: &str) -> AppResult<LoginResponse<AdminSummary>>;

    async fn staff_login(&self, request: LoginRequest) -> AppResult<LoginResponse<StaffSummary>>;

    /// 吊销当前访问令牌及与之配对的刷新令牌
    async fn logout(&self, user: &AuthUser) -> AppResult<()>;

    async fn me(&self, user: &AuthUser) -> AppResult<MeResponse>;

    /// 刷新令牌只能使用一次
    async fn refresh_token(&self, refresh_token: &str) -> AppResult<TokenResponse>;

    async fn forgot_password(&self, email: &str) -> AppResult<ForgotPasswordResponse>;

    async fn reset_password(&self, request: ResetPasswordRequest) -> AppResult<()>;
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

fn invalid_refresh_token() -> AppError {
    AppError::Unauthorized("Invalid refresh token".to_string())
}

#[derive(Clone)]
pub struct AuthService {
    database: Arc<Database>,
    jwt_manager: Arc<JwtManager>,
    permissions: Arc<PermissionManager>,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(
        database: Arc<Database>,
        jwt_manager: Arc<JwtManager>,
        permissions: Arc<PermissionManager>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            database,
            jwt_manager,
            permissions,
            config,
        }
    }

    fn admin_subject(&self, admin: &AdminUser) -> TokenSubject {
        TokenSubject {
            sub: admin.id.clone(),
            kind: PrincipalKind::Admin,
            role: admin.role.as_str().to_string(),
            permissions: self.permissions.token_permissions(admin),
        }
    }

    fn staff_subject(user: &StaffUser) -> TokenSubject {
        TokenSubject {
            sub: user.id.to_string(),
            kind: PrincipalKind::Staff,
            role: "staff".to_string(),
            permissions: Vec::new(),
        }
    }

    /// 签发令牌对并登记刷新会话
    async fn issue_tokens(&self, subject: &TokenSubject) -> AppResult<TokenResponse> {
        let pair = self.jwt_manager.generate_token_pair(subject)?;

        self.database
            .store_refresh_session(RefreshSession {
                jti: pair.refresh_jti.clone(),
                subject: subject.sub.clone(),
                access_jti: pair.access_jti.clone(),
                expires_at: pair.refresh_expires_at,
            })
            .await?;

        Ok(TokenResponse {
            token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.access_expires_at,
        })
    }

    async fn active_staff(&self, id: i64) -> AppResult<StaffUser> {
        let user = self.database.get_staff(id).await?;
        if !user.is_active {
            return Err(AppError::Forbidden("Account is inactive. Please contact HR.".to_string()));
        }
        Ok(user)
    }

    async fn active_admin(&self, id: &str) -> AppResult<AdminUser> {
        let admin = self.database.get_admin(id).await?;
        if !admin.is_active {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }
        Ok(admin)
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn admin_login(&self, request: LoginRequest, ip: &str) -> AppResult<LoginResponse<AdminSummary>> {
        let admin = self
            .database
            .find_admin_by_email(&request.email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !PasswordHasher::verify(&request.password, &admin.password_hash) {
            warn!("🔐 管理员登录失败: {}", request.email);
            return Err(invalid_credentials());
        }
        if !admin.is_active {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }

        let admin = self.database.touch_admin_login(&admin.id).await?;
        let tokens = self.issue_tokens(&self.admin_subject(&admin)).await?;

        self.database
            .append_audit_log(NewAuditLog {
                admin_id: admin.id.clone(),
                admin_name: admin.name.clone(),
                action: "User login".to_string(),
                target: "System".to_string(),
                description: format!("{} logged in", admin.name),
                ip_address: ip.to_string(),
            })
            .await?;

        info!("✅ 管理员登录: {} ({})", admin.email, admin.role);
        let summary = AdminSummary::new(&admin, self.permissions.effective_permissions(&admin));
        Ok(LoginResponse::new(summary, tokens))
    }

    async fn staff_login(&self, request: LoginRequest) -> AppResult<LoginResponse<StaffSummary>> {
        let user = self
            .database
            .find_staff_by_email(&request.email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !PasswordHasher::verify(&request.password, &user.password_hash) {
            warn!("🔐 员工登录失败: {}", request.email);
            return Err(invalid_credentials());
        }
        if !user.is_active {
            return Err(AppError::Forbidden("Account is inactive. Please contact HR.".to_string()));
        }

        let tokens = self.issue_tokens(&Self::staff_subject(&user)).await?;

        info!("✅ 员工登录: {}", user.email);
        Ok(LoginResponse::new(StaffSummary::from(&user), tokens))
    }

    async fn logout(&self, user: &AuthUser) -> AppResult<()> {
        self.database
            .revoke_access_token(&user.token_id, expiry_to_datetime(user.token_exp))
            .await?;

        info!("👋 {} 已登出", user.subject);
        Ok(())
    }

    async fn me(&self, user: &AuthUser) -> AppResult<MeResponse> {
        match user.kind {
            PrincipalKind::Admin => {
                let admin = self.database.get_admin(&user.subject).await?;
                let permissions = self.permissions.effective_permissions(&admin);
                Ok(MeResponse::Admin(AdminSummary::new(&admin, permissions)))
            }
            PrincipalKind::Staff => {
                let id = user
                    .staff_id()
                    .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;
                Ok(MeResponse::Staff(self.database.get_staff(id).await?))
            }
        }
    }

    async fn refresh_token(&self, refresh_token: &str) -> AppResult<TokenResponse> {
        let claims = self
            .jwt_manager
            .verify_token_of(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                warn!("Refresh token verification failed: {}", e);
                invalid_refresh_token()
            })?;

        // 取出即作废，重复使用同一个刷新令牌会失败
        let session = self
            .database
            .take_refresh_session(&claims.jti)
            .await?
            .ok_or_else(invalid_refresh_token)?;
        if session.subject != claims.sub {
            return Err(invalid_refresh_token());
        }

        // 按账号最新状态重新签发，角色或权限变更在此生效
        let subject = match claims.kind {
            PrincipalKind::Admin => self.admin_subject(&self.active_admin(&claims.sub).await?),
            PrincipalKind::Staff => {
                let id = claims.sub.parse::<i64>().map_err(|_| invalid_refresh_token())?;
                Self::staff_subject(&self.active_staff(id).await?)
            }
        };

        let tokens = self.issue_tokens(&subject).await?;
        info!("🔄 令牌已刷新: {}", claims.sub);
        Ok(tokens)
    }

    async fn forgot_password(&self, email: &str) -> AppResult<ForgotPasswordResponse> {
        let known = self.database.find_staff_by_email(email).await?.is_some()
            || self.database.find_admin_by_email(email).await?.is_some();
        if !known {
            return Err(AppError::NotFound("Email not found".to_string()));
        }

        let token = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + Duration::minutes(self.config.reset_token_ttl_minutes as i64);

        self.database
            .store_reset_token(ResetToken {
                token: token.clone(),
                email: email.to_lowercase(),
                expires_at,
            })
            .await?;

        // 生产环境应通过邮件发送令牌
        if self.config.is_production() {
            info!("📧 已为 {} 生成密码重置令牌", email);
            Ok(ForgotPasswordResponse {
                reset_token: None,
                expires_at,
            })
        } else {
            info!("📧 密码重置令牌 {} -> {}", email, token);
            Ok(ForgotPasswordResponse {
                reset_token: Some(token),
                expires_at,
            })
        }
    }

    async fn reset_password(&self, request: ResetPasswordRequest) -> AppResult<()> {
        let email = self
            .database
            .consume_reset_token(&request.token, Utc::now())
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

        let password_hash = PasswordHasher::hash(&request.new_password)?;

        if let Some(user) = self.database.find_staff_by_email(&email).await? {
            self.database.set_staff_password(user.id, password_hash).await?;
        } else if let Some(admin) = self.database.find_admin_by_email(&email).await? {
            self.database.set_admin_password(&admin.id, password_hash).await?;
        } else {
            return Err(AppError::NotFound("Email not found".to_string()));
        }

        info!("🔑 密码已重置: {}", email);
        Ok(())
    }
}
