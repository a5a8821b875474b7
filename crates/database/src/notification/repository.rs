use crate::{
    notification::model::{NewNotification, Notification},
    Database,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use utils::{AppError, AppResult};

pub type DynNotificationRepository = Arc<dyn NotificationRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait NotificationRepositoryTrait {
    async fn push_notification(&self, notification: NewNotification) -> AppResult<Notification>;

    /// 按时间倒序
    async fn find_notifications(&self, user_id: i64) -> AppResult<Vec<Notification>>;

    async fn mark_notification_read(&self, user_id: i64, id: i64) -> AppResult<Notification>;

    /// 返回被标记的数量
    async fn mark_all_notifications_read(&self, user_id: i64) -> AppResult<usize>;
}

#[async_trait]
impl NotificationRepositoryTrait for Database {
    async fn push_notification(&self, notification: NewNotification) -> AppResult<Notification> {
        let mut notifications = self.notifications.write().await;

        let created = Notification {
            id: self.notifications.next_id(),
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            is_read: false,
            created_at: Utc::now(),
        };
        notifications.push(created.clone());

        Ok(created)
    }

    async fn find_notifications(&self, user_id: i64) -> AppResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;

        let mut owned: Vec<Notification> = notifications.iter().filter(|n| n.user_id == user_id).cloned().collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(owned)
    }

    async fn mark_notification_read(&self, user_id: i64, id: i64) -> AppResult<Notification> {
        let mut notifications = self.notifications.write().await;

        let notification = notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;
        notification.is_read = true;

        Ok(notification.clone())
    }

    async fn mark_all_notifications_read(&self, user_id: i64) -> AppResult<usize> {
        let mut notifications = self.notifications.write().await;

        let mut marked = 0;
        for notification in notifications.iter_mut().filter(|n| n.user_id == user_id && !n.is_read) {
            notification.is_read = true;
            marked += 1;
        }

        Ok(marked)
    }
}
