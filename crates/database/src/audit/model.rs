use chrono::prelude::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::pagination::contains_ignore_case;

/// 审计日志（只追加）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLog {
    pub id: i64,
    pub admin_id: String,
    pub admin_name: String,
    pub action: String,
    pub target: String,
    pub description: String,
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub admin_id: String,
    pub admin_name: String,
    pub action: String,
    pub target: String,
    pub description: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// 动作名子串匹配
    pub action: Option<String>,
    pub admin_id: Option<String>,
}

impl AuditQuery {
    pub fn matches(&self, log: &AuditLog) -> bool {
        if let Some(action) = self.action.as_deref().filter(|a| !a.is_empty()) {
            if !contains_ignore_case(&log.action, action) {
                return false;
            }
        }
        self.admin_id.as_deref().map_or(true, |id| log.admin_id == id)
    }
}
