use crate::{
    dtos::{
        audit_dto::{AuditListQuery, CreateAuditLogRequest, CreateReportRequest, ReportListQuery},
        common::PageData,
    },
    extractors::Actor,
    services::activity,
};
use async_trait::async_trait;
use database::{
    audit::{model::AuditLog, repository::AuditRepositoryTrait},
    report::{
        model::{NewReport, Report, ReportSchedule},
        repository::ReportRepositoryTrait,
    },
    Database,
};
use std::sync::Arc;
use tracing::{debug, info};
use utils::AppResult;

pub type DynAuditService = Arc<dyn AuditServiceTrait + Send + Sync>;

/// 审计日志与报表
#[async_trait]
pub trait AuditServiceTrait {
    async fn list_audit_logs(&self, query: AuditListQuery) -> AppResult<PageData<AuditLog>>;

    async fn get_audit_log(&self, id: i64) -> AppResult<AuditLog>;

    async fn create_audit_log(&self, actor: &Actor, request: CreateAuditLogRequest) -> AppResult<AuditLog>;

    async fn list_reports(&self, query: ReportListQuery) -> AppResult<Vec<Report>>;

    async fn create_report(&self, actor: &Actor, request: CreateReportRequest) -> AppResult<Report>;

    async fn get_report(&self, id: i64) -> AppResult<Report>;

    async fn schedule_report(&self, actor: &Actor, id: i64, schedule: ReportSchedule) -> AppResult<Report>;

    async fn delete_report(&self, actor: &Actor, id: i64) -> AppResult<Report>;
}

#[derive(Clone)]
pub struct AuditService {
    database: Arc<Database>,
}

impl AuditService {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl AuditServiceTrait for AuditService {
    async fn list_audit_logs(&self, query: AuditListQuery) -> AppResult<PageData<AuditLog>> {
        debug!("🔍 审计日志查询: {:?}", query);

        let logs = self.database.find_audit_logs(&query.to_query()).await?;
        Ok(PageData::paginate(&logs, query.pagination()))
    }

    async fn get_audit_log(&self, id: i64) -> AppResult<AuditLog> {
        self.database.get_audit_log(id).await
    }

    async fn create_audit_log(&self, actor: &Actor, request: CreateAuditLogRequest) -> AppResult<AuditLog> {
        activity::record_audit(
            &self.database,
            actor,
            request.action.trim(),
            request.target.trim(),
            request.description,
        )
        .await
    }

    async fn list_reports(&self, query: ReportListQuery) -> AppResult<Vec<Report>> {
        self.database.find_reports(query.kind).await
    }

    async fn create_report(&self, actor: &Actor, request: CreateReportRequest) -> AppResult<Report> {
        let report = self
            .database
            .create_report(NewReport {
                title: request.title.trim().to_string(),
                kind: request.kind,
                description: request.description,
                created_by: actor.user.subject.clone(),
                schedule: request.schedule.unwrap_or_default(),
            })
            .await?;

        activity::record_audit(
            &self.database,
            actor,
            "Report created",
            format!("Report {}", report.id),
            format!("Created report \"{}\"", report.title),
        )
        .await?;

        Ok(report)
    }

    async fn get_report(&self, id: i64) -> AppResult<Report> {
        self.database.get_report(id).await
    }

    async fn schedule_report(&self, actor: &Actor, id: i64, schedule: ReportSchedule) -> AppResult<Report> {
        let report = self.database.schedule_report(id, schedule).await?;

        activity::record_audit(
            &self.database,
            actor,
            "Report scheduled",
            format!("Report {}", report.id),
            format!("Report \"{}\" scheduled {}", report.title, report.schedule),
        )
        .await?;

        info!("🗓️ 报表 {} 调度为 {}", report.id, report.schedule);
        Ok(report)
    }

    async fn delete_report(&self, actor: &Actor, id: i64) -> AppResult<Report> {
        let report = self.database.delete_report(id).await?;

        activity::record_audit(
            &self.database,
            actor,
            "Report deleted",
            format!("Report {}", report.id),
            format!("Deleted report \"{}\"", report.title),
        )
        .await?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::admin_actor;
    use database::report::model::ReportType;
    use utils::AppError;

    async fn service() -> AuditService {
        AuditService::new(Arc::new(Database::new_for_test().await))
    }

    #[tokio::test]
    async fn test_audit_list_filters_by_action_substring() {
        let service = service().await;

        let page = service
            .list_audit_logs(AuditListQuery {
                action: Some("login".to_string()),
                limit: Some(100),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.meta.total > 0);
        assert!(page
            .items
            .iter()
            .all(|log| log.action.to_lowercase().contains("login")));

        let all = service.list_audit_logs(AuditListQuery::default()).await.unwrap();
        assert_eq!(all.meta.total, 215);
        assert_eq!(all.items.len(), 10);
    }

    #[tokio::test]
    async fn test_create_audit_entry_uses_actor() {
        let service = service().await;
        let actor = admin_actor("admin-2");

        let log = service
            .create_audit_log(
                &actor,
                CreateAuditLogRequest {
                    action: "Manual note".to_string(),
                    target: "System".to_string(),
                    description: "Quarter close".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(log.admin_name, "Manager User");
        assert_eq!(log.ip_address, "127.0.0.1");
        assert_eq!(service.get_audit_log(log.id).await.unwrap().action, "Manual note");
    }

    #[tokio::test]
    async fn test_report_lifecycle() {
        let service = service().await;
        let actor = admin_actor("admin-1");

        let report = service
            .create_report(
                &actor,
                CreateReportRequest {
                    title: "Payout summary".to_string(),
                    kind: ReportType::Withdrawal,
                    description: String::new(),
                    schedule: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(report.schedule, ReportSchedule::None);
        assert!(report.next_run.is_none());

        let scheduled = service
            .schedule_report(&actor, report.id, ReportSchedule::Weekly)
            .await
            .unwrap();
        assert!(scheduled.next_run.is_some());

        let withdrawals = service
            .list_reports(ReportListQuery {
                kind: Some(ReportType::Withdrawal),
            })
            .await
            .unwrap();
        assert!(withdrawals.iter().any(|r| r.id == report.id));

        service.delete_report(&actor, report.id).await.unwrap();
        assert!(matches!(service.get_report(report.id).await, Err(AppError::NotFound(_))));
    }
}
