use chrono::prelude::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FaqEntry {
    pub id: i64,
    pub category: String,
    pub question: String,
    pub answer: String,
}

/// 员工提交的支持请求
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupportRequest {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
