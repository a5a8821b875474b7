// Timer: 按 cron 表达式定时执行内务任务
// - 计划汇率生效后关闭被取代的旧汇率
// - 推进到期的定时报表
// - 清理过期的刷新令牌、吊销记录与重置令牌
use chrono::{DateTime, Utc};
use cron::Schedule;
use database::{
    rate::repository::RateRepositoryTrait, report::repository::ReportRepositoryTrait,
    session::repository::SessionRepositoryTrait, Database,
};
use server::services::Services;
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio::{task, time::sleep_until};
use tracing::{error, info};
use utils::{AppError, AppResult};

const DEFAULT_SCHEDULE: &str = "0 */5 * * * *";

/// 单次内务执行的结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Housekeeping {
    pub closed_rates: usize,
    pub advanced_reports: usize,
    pub purged_sessions: usize,
}

#[derive(Clone)]
pub struct Timer {
    pub time: String,
    pub database: Arc<Database>,
}

impl Timer {
    // "0 */5 * * * *": 每5分钟执行
    pub fn new(time: Option<String>, services: &Services) -> Self {
        Timer {
            time: time.unwrap_or_else(|| DEFAULT_SCHEDULE.to_string()),
            database: services.database.clone(),
        }
    }

    pub async fn run(self: Arc<Self>) -> AppResult<()> {
        let schedule = Schedule::from_str(&self.time)
            .map_err(|e| AppError::BadRequest(format!("Invalid timer schedule '{}': {}", self.time, e)))?;

        info!("⏳ Timer scheduled with '{}'", self.time);

        loop {
            let now = Utc::now();
            let Some(next_run_time) = schedule.upcoming(Utc).next() else {
                info!("⏳ Timer schedule has no upcoming runs, stopping");
                return Ok(());
            };

            let duration_until_next_run = (next_run_time - now).to_std().unwrap_or(Duration::from_secs(0));

            sleep_until(tokio::time::Instant::now() + duration_until_next_run).await;

            let joined = task::spawn({
                let this = Arc::clone(&self);
                async move { this.run_housekeeping(Utc::now()).await }
            })
            .await;

            match joined {
                Ok(Ok(summary)) => info!(
                    "🧹 内务完成: 关闭汇率 {}, 推进报表 {}, 清理会话 {}",
                    summary.closed_rates, summary.advanced_reports, summary.purged_sessions
                ),
                Ok(Err(e)) => error!("🔴 内务任务失败: {}", e),
                Err(e) => error!("🔴 内务任务异常退出: {}", e),
            }
        }
    }

    pub async fn run_housekeeping(&self, now: DateTime<Utc>) -> AppResult<Housekeeping> {
        let closed_rates = self.database.close_superseded_rates(now).await?;
        let advanced_reports = self.database.advance_due_reports(now).await?.len();
        let purged_sessions = self.database.purge_expired_sessions(now).await?;

        Ok(Housekeeping {
            closed_rates,
            advanced_reports,
            purged_sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use database::report::model::ReportSchedule;
    use rust_decimal::Decimal;
    use utils::AppConfig;

    async fn timer() -> Timer {
        let config = Arc::new(AppConfig::new_for_test());
        let services = Services::new(Database::new_for_test().await, config);
        Timer::new(None, &services)
    }

    #[tokio::test]
    async fn test_default_schedule_parses() {
        let timer = timer().await;
        assert_eq!(timer.time, DEFAULT_SCHEDULE);
        assert!(Schedule::from_str(&timer.time).is_ok());
    }

    #[tokio::test]
    async fn test_housekeeping_closes_superseded_rate() {
        let timer = timer().await;
        let effective_from = Utc::now() + ChronoDuration::hours(1);
        timer
            .database
            .schedule_rate(Decimal::new(12, 0), effective_from, "admin-1")
            .await
            .unwrap();

        let summary = timer.run_housekeeping(effective_from + ChronoDuration::minutes(1)).await.unwrap();
        assert_eq!(summary.closed_rates, 1);

        let current = timer.database.current_rate(effective_from + ChronoDuration::minutes(2)).await.unwrap();
        assert_eq!(current.rate, Decimal::new(12, 0));
    }

    #[tokio::test]
    async fn test_housekeeping_advances_due_reports() {
        let timer = timer().await;
        let report = timer.database.schedule_report(1, ReportSchedule::Daily).await.unwrap();
        let due_at = report.next_run.unwrap() + ChronoDuration::hours(1);

        let summary = timer.run_housekeeping(due_at).await.unwrap();
        assert!(summary.advanced_reports >= 1);
        assert!(timer.database.get_report(1).await.unwrap().next_run.unwrap() > due_at);
    }

    #[tokio::test]
    async fn test_invalid_schedule_is_rejected() {
        let mut timer = timer().await;
        timer.time = "not a cron".to_string();
        assert!(Arc::new(timer).run().await.is_err());
    }
}
