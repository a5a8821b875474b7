use chrono::{DateTime, Utc};
use database::{
    admin::model::{AdminPermission, AdminRole, AdminUser},
    staff::model::StaffUser,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// 管理员登录返回的用户摘要
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    pub permissions: Vec<AdminPermission>,
    pub last_login: Option<DateTime<Utc>>,
}

impl AdminSummary {
    pub fn new(admin: &AdminUser, permissions: Vec<AdminPermission>) -> Self {
        Self {
            id: admin.id.clone(),
            name: admin.name.clone(),
            email: admin.email.clone(),
            role: admin.role,
            permissions,
            last_login: admin.last_login,
        }
    }
}

/// 员工登录返回的用户摘要
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub referral_code: String,
    pub points_balance: i64,
    pub avatar: String,
}

impl From<&StaffUser> for StaffSummary {
    fn from(user: &StaffUser) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            referral_code: user.referral_code.clone(),
            points_balance: user.points_balance,
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse<U> {
    pub user: U,
    pub token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl<U> LoginResponse<U> {
    pub fn new(user: U, tokens: TokenResponse) -> Self {
        Self {
            user,
            token: tokens.token,
            refresh_token: tokens.refresh_token,
            expires_at: tokens.expires_at,
        }
    }
}

/// 当前登录主体
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user", rename_all = "snake_case")]
pub enum MeResponse {
    Admin(AdminSummary),
    Staff(StaffUser),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ForgotPasswordResponse {
    /// 仅开发环境返回，生产环境通过邮件发送
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            email: "admin@company.com".to_string(),
            password: "admin123".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_reset_password_requires_eight_chars() {
        let short = ResetPasswordRequest {
            token: "abc".to_string(),
            new_password: "short".to_string(),
        };
        assert!(short.validate().is_err());

        let long = ResetPasswordRequest {
            token: "abc".to_string(),
            new_password: "long-enough".to_string(),
        };
        assert!(long.validate().is_ok());
    }
}
