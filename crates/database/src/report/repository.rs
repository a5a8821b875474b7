use crate::{
    report::model::{NewReport, Report, ReportSchedule, ReportType},
    Database,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use utils::{AppError, AppResult};

pub type DynReportRepository = Arc<dyn ReportRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait ReportRepositoryTrait {
    async fn find_reports(&self, kind: Option<ReportType>) -> AppResult<Vec<Report>>;

    async fn get_report(&self, id: i64) -> AppResult<Report>;

    async fn create_report(&self, report: NewReport) -> AppResult<Report>;

    async fn schedule_report(&self, id: i64, schedule: ReportSchedule) -> AppResult<Report>;

    async fn delete_report(&self, id: i64) -> AppResult<Report>;

    /// 推进已到期报表的 next_run，返回被推进的报表
    async fn advance_due_reports(&self, now: DateTime<Utc>) -> AppResult<Vec<Report>>;
}

fn report_not_found() -> AppError {
    AppError::NotFound("Report not found".to_string())
}

#[async_trait]
impl ReportRepositoryTrait for Database {
    async fn find_reports(&self, kind: Option<ReportType>) -> AppResult<Vec<Report>> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .filter(|r| kind.map_or(true, |k| r.kind == k))
            .cloned()
            .collect())
    }

    async fn get_report(&self, id: i64) -> AppResult<Report> {
        let reports = self.reports.read().await;
        reports.iter().find(|r| r.id == id).cloned().ok_or_else(report_not_found)
    }

    async fn create_report(&self, report: NewReport) -> AppResult<Report> {
        let mut reports = self.reports.write().await;
        let now = Utc::now();

        let created = Report {
            id: self.reports.next_id(),
            title: report.title,
            kind: report.kind,
            description: report.description,
            created_by: report.created_by,
            created_at: now,
            schedule: report.schedule,
            next_run: report.schedule.next_run_after(now),
        };
        reports.push(created.clone());

        info!("📊 新建报表 {} ({})", created.id, created.title);
        Ok(created)
    }

    async fn schedule_report(&self, id: i64, schedule: ReportSchedule) -> AppResult<Report> {
        let mut reports = self.reports.write().await;
        let report = reports.iter_mut().find(|r| r.id == id).ok_or_else(report_not_found)?;

        report.schedule = schedule;
        report.next_run = schedule.next_run_after(Utc::now());

        Ok(report.clone())
    }

    async fn delete_report(&self, id: i64) -> AppResult<Report> {
        let mut reports = self.reports.write().await;
        let index = reports.iter().position(|r| r.id == id).ok_or_else(report_not_found)?;
        Ok(reports.remove(index))
    }

    async fn advance_due_reports(&self, now: DateTime<Utc>) -> AppResult<Vec<Report>> {
        let mut reports = self.reports.write().await;
        let mut advanced = Vec::new();

        for report in reports.iter_mut() {
            let Some(mut next_run) = report.next_run else {
                continue;
            };
            if next_run > now {
                continue;
            }
            // 长时间未运行时直接跳到 now 之后
            while next_run <= now {
                match report.schedule.next_run_after(next_run) {
                    Some(next) => next_run = next,
                    None => break,
                }
            }
            report.next_run = Some(next_run).filter(|n| *n > now);
            advanced.push(report.clone());
        }

        Ok(advanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_report_crud() {
        let db = Database::new_for_test().await;
        assert_eq!(db.find_reports(None).await.unwrap().len(), 3);
        assert_eq!(db.find_reports(Some(ReportType::Withdrawal)).await.unwrap().len(), 1);

        let created = db
            .create_report(NewReport {
                title: "Points Summary".to_string(),
                kind: ReportType::Points,
                description: String::new(),
                created_by: "admin-1".to_string(),
                schedule: ReportSchedule::None,
            })
            .await
            .unwrap();
        assert!(created.next_run.is_none());

        let scheduled = db.schedule_report(created.id, ReportSchedule::Daily).await.unwrap();
        assert!(scheduled.next_run.unwrap() > Utc::now());

        db.delete_report(created.id).await.unwrap();
        assert!(matches!(db.get_report(created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_advance_due_reports() {
        let db = Database::new_for_test().await;
        let report = db.schedule_report(2, ReportSchedule::Weekly).await.unwrap();
        let due_at = report.next_run.unwrap() + Duration::days(20);

        let advanced = db.advance_due_reports(due_at).await.unwrap();
        let advanced = advanced.iter().find(|r| r.id == 2).unwrap();
        assert!(advanced.next_run.unwrap() > due_at);
        assert!(advanced.next_run.unwrap() <= due_at + Duration::weeks(1));
    }
}
