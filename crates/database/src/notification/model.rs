use chrono::prelude::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Referral,
    Withdrawal,
    Points,
    System,
}

/// 员工站内通知
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    pub fn new(user_id: i64, kind: NotificationType, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}
