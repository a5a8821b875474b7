use crate::{
    audit::model::{AuditLog, AuditQuery, NewAuditLog},
    Database,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use utils::{AppError, AppResult};

pub type DynAuditRepository = Arc<dyn AuditRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait AuditRepositoryTrait {
    async fn append_audit_log(&self, log: NewAuditLog) -> AppResult<AuditLog>;

    /// 按时间倒序
    async fn find_audit_logs(&self, query: &AuditQuery) -> AppResult<Vec<AuditLog>>;

    async fn get_audit_log(&self, id: i64) -> AppResult<AuditLog>;
}

#[async_trait]
impl AuditRepositoryTrait for Database {
    async fn append_audit_log(&self, log: NewAuditLog) -> AppResult<AuditLog> {
        let mut logs = self.audit_logs.write().await;

        let created = AuditLog {
            id: self.audit_logs.next_id(),
            admin_id: log.admin_id,
            admin_name: log.admin_name,
            action: log.action,
            target: log.target,
            description: log.description,
            ip_address: log.ip_address,
            created_at: Utc::now(),
        };
        logs.push(created.clone());

        debug!("📝 审计: {} {} -> {}", created.admin_name, created.action, created.target);
        Ok(created)
    }

    async fn find_audit_logs(&self, query: &AuditQuery) -> AppResult<Vec<AuditLog>> {
        let logs = self.audit_logs.read().await;

        let mut filtered: Vec<AuditLog> = logs.iter().filter(|l| query.matches(l)).cloned().collect();
        filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(filtered)
    }

    async fn get_audit_log(&self, id: i64) -> AppResult<AuditLog> {
        let logs = self.audit_logs.read().await;
        logs.iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Audit log not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_filter() {
        let db = Database::new_for_test().await;
        assert_eq!(db.audit_logs.count().await, 215);

        let created = db
            .append_audit_log(NewAuditLog {
                admin_id: "admin-2".to_string(),
                admin_name: "Manager User".to_string(),
                action: "Custom Export".to_string(),
                target: "System".to_string(),
                description: "Exported data".to_string(),
                ip_address: "127.0.0.1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(created.id, 216);

        let found = db
            .find_audit_logs(&AuditQuery {
                action: Some("custom export".to_string()),
                admin_id: Some("admin-2".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, created.id);

        assert_eq!(db.get_audit_log(created.id).await.unwrap().action, "Custom Export");
        assert!(db.get_audit_log(99999).await.is_err());
    }
}
