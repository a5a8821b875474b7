use crate::dtos::staff_dto::{
    AvatarResponse, HoursSyncStatus, MarkAllReadResponse, NotificationList, SupportRequestBody, UpdatePasswordRequest,
    UpdateProfileRequest,
};
use async_trait::async_trait;
use chrono::Utc;
use database::{
    notification::{model::Notification, repository::NotificationRepositoryTrait},
    staff::{
        model::{StaffHours, StaffUpdate, StaffUser},
        repository::StaffRepositoryTrait,
    },
    support::{
        model::{FaqEntry, SupportRequest},
        repository::SupportRepositoryTrait,
    },
    Database,
};
use std::sync::Arc;
use tracing::info;
use utils::{AppError, AppResult, PasswordHasher};

pub type DynAccountService = Arc<dyn AccountServiceTrait + Send + Sync>;

/// 员工端的工时、通知、个人资料与帮助
#[async_trait]
pub trait AccountServiceTrait {
    async fn hours(&self, staff_id: i64) -> AppResult<StaffHours>;

    async fn hours_sync_status(&self, staff_id: i64) -> AppResult<HoursSyncStatus>;

    async fn notifications(&self, staff_id: i64) -> AppResult<NotificationList>;

    async fn mark_read(&self, staff_id: i64, id: i64) -> AppResult<Notification>;

    async fn mark_all_read(&self, staff_id: i64) -> AppResult<MarkAllReadResponse>;

    async fn profile(&self, staff_id: i64) -> AppResult<StaffUser>;

    async fn update_profile(&self, staff_id: i64, request: UpdateProfileRequest) -> AppResult<StaffUser>;

    /// 需校验当前密码
    async fn update_password(&self, staff_id: i64, request: UpdatePasswordRequest) -> AppResult<()>;

    async fn update_avatar(&self, staff_id: i64, avatar_url: String) -> AppResult<AvatarResponse>;

    async fn faq(&self) -> AppResult<Vec<FaqEntry>>;

    async fn submit_support_request(&self, staff_id: i64, request: SupportRequestBody) -> AppResult<SupportRequest>;
}

#[derive(Clone)]
pub struct AccountService {
    database: Arc<Database>,
}

impl AccountService {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl AccountServiceTrait for AccountService {
    async fn hours(&self, staff_id: i64) -> AppResult<StaffHours> {
        Ok(self.database.get_staff(staff_id).await?.hours)
    }

    async fn hours_sync_status(&self, staff_id: i64) -> AppResult<HoursSyncStatus> {
        // 工时由外部系统同步，这里只报告状态
        self.database.get_staff(staff_id).await?;
        Ok(HoursSyncStatus {
            last_synced: Utc::now(),
            status: "synced".to_string(),
        })
    }

    async fn notifications(&self, staff_id: i64) -> AppResult<NotificationList> {
        let items = self.database.find_notifications(staff_id).await?;
        let unread_count = items.iter().filter(|n| !n.is_read).count();

        Ok(NotificationList {
            total: items.len(),
            unread_count,
            items,
        })
    }

    async fn mark_read(&self, staff_id: i64, id: i64) -> AppResult<Notification> {
        self.database.mark_notification_read(staff_id, id).await
    }

    async fn mark_all_read(&self, staff_id: i64) -> AppResult<MarkAllReadResponse> {
        let updated = self.database.mark_all_notifications_read(staff_id).await?;
        Ok(MarkAllReadResponse { updated })
    }

    async fn profile(&self, staff_id: i64) -> AppResult<StaffUser> {
        self.database.get_staff(staff_id).await
    }

    async fn update_profile(&self, staff_id: i64, request: UpdateProfileRequest) -> AppResult<StaffUser> {
        let update: StaffUpdate = request.into();
        if update.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }
        self.database.update_staff(staff_id, update).await
    }

    async fn update_password(&self, staff_id: i64, request: UpdatePasswordRequest) -> AppResult<()> {
        let user = self.database.get_staff(staff_id).await?;

        if !PasswordHasher::verify(&request.current_password, &user.password_hash) {
            return Err(AppError::BadRequest("Current password is incorrect".to_string()));
        }
        if request.current_password == request.new_password {
            return Err(AppError::BadRequest(
                "New password must differ from the current password".to_string(),
            ));
        }

        let password_hash = PasswordHasher::hash(&request.new_password)?;
        self.database.set_staff_password(staff_id, password_hash).await?;

        info!("🔑 员工 {} 修改了密码", staff_id);
        Ok(())
    }

    async fn update_avatar(&self, staff_id: i64, avatar_url: String) -> AppResult<AvatarResponse> {
        let user = self.database.set_staff_avatar(staff_id, avatar_url).await?;
        Ok(AvatarResponse { avatar_url: user.avatar })
    }

    async fn faq(&self) -> AppResult<Vec<FaqEntry>> {
        self.database.list_faq().await
    }

    async fn submit_support_request(&self, staff_id: i64, request: SupportRequestBody) -> AppResult<SupportRequest> {
        self.database.get_staff(staff_id).await?;
        self.database
            .create_support_request(staff_id, request.subject.trim().to_string(), request.message.trim().to_string())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::{
        notification::model::{NewNotification, NotificationType},
        seed::STAFF_PASSWORD,
    };

    async fn service() -> (AccountService, Arc<Database>) {
        let database = Arc::new(Database::new_for_test().await);
        (AccountService::new(database.clone()), database)
    }

    #[tokio::test]
    async fn test_notifications_unread_flow() {
        let (service, database) = service().await;
        database
            .push_notification(NewNotification::new(5, NotificationType::System, "Hello", "Welcome aboard"))
            .await
            .unwrap();

        let list = service.notifications(5).await.unwrap();
        assert!(list.unread_count >= 1);
        assert_eq!(list.total, list.items.len());

        let first = service.mark_read(5, list.items[0].id).await.unwrap();
        assert!(first.is_read);

        service.mark_all_read(5).await.unwrap();
        assert_eq!(service.notifications(5).await.unwrap().unread_count, 0);

        // 他人的通知不可标记
        assert!(matches!(service.mark_read(6, first.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_password_update_verifies_current() {
        let (service, database) = service().await;

        let wrong = UpdatePasswordRequest {
            current_password: "not-my-password".to_string(),
            new_password: "brand-new-pass".to_string(),
        };
        assert!(matches!(service.update_password(2, wrong).await, Err(AppError::BadRequest(_))));

        service
            .update_password(
                2,
                UpdatePasswordRequest {
                    current_password: STAFF_PASSWORD.to_string(),
                    new_password: "brand-new-pass".to_string(),
                },
            )
            .await
            .unwrap();
        let user = database.get_staff(2).await.unwrap();
        assert!(PasswordHasher::verify("brand-new-pass", &user.password_hash));
    }

    #[tokio::test]
    async fn test_profile_update_and_avatar() {
        let (service, _) = service().await;

        let user = service
            .update_profile(
                3,
                UpdateProfileRequest {
                    location: Some("Abuja".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(user.location, "Abuja");

        assert!(service.update_profile(3, UpdateProfileRequest::default()).await.is_err());

        let avatar = service
            .update_avatar(3, "https://cdn.example.com/a.png".to_string())
            .await
            .unwrap();
        assert_eq!(service.profile(3).await.unwrap().avatar, avatar.avatar_url);
    }

    #[tokio::test]
    async fn test_hours_faq_and_support() {
        let (service, _) = service().await;

        assert_eq!(service.hours(1).await.unwrap().current_month, 160);
        assert_eq!(service.hours_sync_status(1).await.unwrap().status, "synced");
        assert_eq!(service.faq().await.unwrap().len(), 10);

        let request = service
            .submit_support_request(
                1,
                SupportRequestBody {
                    subject: "Missing points".to_string(),
                    message: "My last referral did not credit points".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(request.user_id, 1);
        assert!(service.hours(999).await.is_err());
    }
}
