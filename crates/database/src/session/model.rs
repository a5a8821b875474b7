use chrono::prelude::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 有效的刷新令牌，与签发时的访问令牌配对
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshSession {
    pub jti: String,
    pub subject: String,
    pub access_jti: String,
    pub expires_at: DateTime<Utc>,
}

/// 已注销但尚未过期的访问令牌
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevokedToken {
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// 一次性密码重置令牌
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResetToken {
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}
