use crate::{
    support::model::{FaqEntry, SupportRequest},
    Database,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use utils::AppResult;

pub type DynSupportRepository = Arc<dyn SupportRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait SupportRepositoryTrait {
    async fn list_faq(&self) -> AppResult<Vec<FaqEntry>>;

    async fn create_support_request(&self, user_id: i64, subject: String, message: String)
        -> AppResult<SupportRequest>;
}

#[async_trait]
impl SupportRepositoryTrait for Database {
    async fn list_faq(&self) -> AppResult<Vec<FaqEntry>> {
        Ok(self.faqs.read().await.clone())
    }

    async fn create_support_request(
        &self,
        user_id: i64,
        subject: String,
        message: String,
    ) -> AppResult<SupportRequest> {
        let mut requests = self.support_requests.write().await;

        let created = SupportRequest {
            id: self.support_requests.next_id(),
            user_id,
            subject,
            message,
            created_at: Utc::now(),
        };
        requests.push(created.clone());

        info!("🆘 员工 {} 提交支持请求 #{}", user_id, created.id);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_faq_and_support() {
        let db = Database::new_for_test().await;
        assert_eq!(db.list_faq().await.unwrap().len(), 10);

        let request = db
            .create_support_request(1, "Payout".to_string(), "Where is my money?".to_string())
            .await
            .unwrap();
        assert_eq!(request.id, 1);
        assert_eq!(db.support_requests.count().await, 1);
    }
}
