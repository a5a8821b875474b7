use database::admin::model::{AdminPermission, AdminRole};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use utils::AppConfig;
use utoipa::ToSchema;

/// 令牌签发者
pub const TOKEN_ISSUER: &str = "referral-hub";

/// JWT Claims 结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// 主体ID（管理员为 admin-N，员工为数字ID）
    pub sub: String,
    /// 主体类型
    pub kind: PrincipalKind,
    /// 管理员角色，员工固定为 "staff"
    pub role: String,
    /// 权限列表
    pub permissions: Vec<String>,
    /// 访问令牌 / 刷新令牌
    pub token_type: TokenKind,
    /// 令牌唯一ID，用于吊销
    pub jti: String,
    /// 签发时间
    pub iat: u64,
    /// 过期时间
    pub exp: u64,
    /// 签发者
    pub iss: String,
}

/// 登录主体类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    Admin,
    Staff,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// 认证配置
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expires_in_hours: u64,
    pub refresh_expires_in_hours: u64,
    pub reset_token_ttl_minutes: u64,
}

impl AuthConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            jwt_expires_in_hours: config.jwt_expires_in_hours,
            refresh_expires_in_hours: config.refresh_expires_in_hours,
            reset_token_ttl_minutes: config.reset_token_ttl_minutes,
        }
    }
}

impl From<Arc<AppConfig>> for AuthConfig {
    fn from(config: Arc<AppConfig>) -> Self {
        Self::from_app_config(&config)
    }
}

/// 认证用户信息（由中间件写入请求扩展）
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: String,
    pub kind: PrincipalKind,
    pub role: Option<AdminRole>,
    pub permissions: HashSet<AdminPermission>,
    /// 当前访问令牌的 jti 与过期时间，登出时吊销
    pub token_id: String,
    pub token_exp: u64,
}

impl AuthUser {
    pub fn from_claims(claims: &Claims) -> Self {
        let role = match claims.kind {
            PrincipalKind::Admin => claims.role.parse::<AdminRole>().ok(),
            PrincipalKind::Staff => None,
        };

        Self {
            subject: claims.sub.clone(),
            kind: claims.kind,
            role,
            permissions: claims
                .permissions
                .iter()
                .filter_map(|p| p.parse::<AdminPermission>().ok())
                .collect(),
            token_id: claims.jti.clone(),
            token_exp: claims.exp,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.kind == PrincipalKind::Admin
    }

    pub fn is_staff(&self) -> bool {
        self.kind == PrincipalKind::Staff
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Some(AdminRole::SuperAdmin)
    }

    pub fn has_permission(&self, permission: AdminPermission) -> bool {
        self.is_super_admin() || self.permissions.contains(&permission)
    }

    /// 员工令牌的数字ID
    pub fn staff_id(&self) -> Option<i64> {
        match self.kind {
            PrincipalKind::Staff => self.subject.parse().ok(),
            PrincipalKind::Admin => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(kind: PrincipalKind, role: &str, permissions: &[&str]) -> Claims {
        Claims {
            sub: match kind {
                PrincipalKind::Admin => "admin-2".to_string(),
                PrincipalKind::Staff => "7".to_string(),
            },
            kind,
            role: role.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            token_type: TokenKind::Access,
            jti: "jti-1".to_string(),
            iat: 0,
            exp: 10,
            iss: TOKEN_ISSUER.to_string(),
        }
    }

    #[test]
    fn test_admin_from_claims() {
        let user = AuthUser::from_claims(&claims(
            PrincipalKind::Admin,
            "manager",
            &["view_users", "approve_withdrawals", "bogus"],
        ));

        assert!(user.is_admin());
        assert_eq!(user.role, Some(AdminRole::Manager));
        assert_eq!(user.permissions.len(), 2);
        assert!(user.has_permission(AdminPermission::ViewUsers));
        assert!(!user.has_permission(AdminPermission::ManageSettings));
        assert_eq!(user.staff_id(), None);
    }

    #[test]
    fn test_super_admin_has_everything() {
        let user = AuthUser::from_claims(&claims(PrincipalKind::Admin, "super_admin", &[]));
        assert!(user.is_super_admin());
        assert!(user.has_permission(AdminPermission::DeleteUsers));
    }

    #[test]
    fn test_staff_id() {
        let user = AuthUser::from_claims(&claims(PrincipalKind::Staff, "staff", &[]));
        assert!(user.is_staff());
        assert_eq!(user.staff_id(), Some(7));
        assert!(!user.has_permission(AdminPermission::ViewUsers));
    }
}
