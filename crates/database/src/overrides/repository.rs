use crate::{
    overrides::model::{NewOverrideRecord, OverrideRecord},
    Database,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;
use utils::AppResult;

pub type DynOverrideRepository = Arc<dyn OverrideRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OverrideRepositoryTrait {
    async fn record_override(&self, record: NewOverrideRecord) -> AppResult<OverrideRecord>;

    /// 按时间倒序
    async fn list_overrides(&self) -> AppResult<Vec<OverrideRecord>>;
}

#[async_trait]
impl OverrideRepositoryTrait for Database {
    async fn record_override(&self, record: NewOverrideRecord) -> AppResult<OverrideRecord> {
        let mut records = self.override_records.write().await;

        let created = OverrideRecord {
            id: self.override_records.next_id(),
            action: record.action,
            resource_id: record.resource_id,
            reason: record.reason,
            admin_id: record.admin_id,
            admin_name: record.admin_name,
            status: "completed".to_string(),
            created_at: Utc::now(),
        };
        records.push(created.clone());

        warn!(
            "🚨 override {} on {} by {}",
            created.action.as_str(),
            created.resource_id,
            created.admin_id
        );
        Ok(created)
    }

    async fn list_overrides(&self) -> AppResult<Vec<OverrideRecord>> {
        let mut records = self.override_records.read().await.clone();
        records.reverse();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::model::OverrideAction;

    #[tokio::test]
    async fn test_record_and_list() {
        let db = Database::new_for_test().await;

        for resource in ["1", "2"] {
            db.record_override(NewOverrideRecord {
                action: OverrideAction::UserStatus,
                resource_id: resource.to_string(),
                reason: "Account restored after HR review".to_string(),
                admin_id: "admin-1".to_string(),
                admin_name: "Admin Super".to_string(),
            })
            .await
            .unwrap();
        }

        let records = db.list_overrides().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].resource_id, "2");
        assert_eq!(records[0].status, "completed");
    }
}
