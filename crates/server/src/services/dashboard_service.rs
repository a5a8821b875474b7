use crate::dtos::dashboard_dto::{
    ActivityItem, ActivityKind, AlertLevel, DashboardAlert, DashboardCharts, DashboardStats, DepartmentShare,
    MonthlyAmount, MonthlyCount, TopPerformer, UserCounts, WithdrawalCounts,
};
use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use database::{
    referral::{
        model::{ReferralQuery, ReferralStats},
        repository::ReferralRepositoryTrait,
    },
    settings::repository::SettingsRepositoryTrait,
    staff::{model::StaffQuery, repository::StaffRepositoryTrait},
    withdrawal::{
        model::{Withdrawal, WithdrawalQuery, WithdrawalStatus},
        repository::WithdrawalRepositoryTrait,
    },
    Database,
};
use rust_decimal::Decimal;
use std::{collections::BTreeMap, sync::Arc};
use utils::AppResult;

const CHART_MONTHS: u32 = 12;
const TOP_PERFORMERS: usize = 10;
const RECENT_ACTIVITY: usize = 10;

pub type DynDashboardService = Arc<dyn DashboardServiceTrait + Send + Sync>;

#[async_trait]
pub trait DashboardServiceTrait {
    async fn stats(&self) -> AppResult<DashboardStats>;

    async fn charts(&self) -> AppResult<DashboardCharts>;

    /// 推荐与提现合并后的最近动态
    async fn recent(&self) -> AppResult<Vec<ActivityItem>>;

    async fn alerts(&self) -> AppResult<Vec<DashboardAlert>>;
}

fn withdrawal_counts(withdrawals: &[Withdrawal]) -> WithdrawalCounts {
    withdrawals.iter().fold(WithdrawalCounts::default(), |mut counts, w| {
        counts.total += 1;
        match w.status {
            WithdrawalStatus::Pending => counts.pending += 1,
            WithdrawalStatus::Approved => counts.approved += 1,
            WithdrawalStatus::Processing => counts.processing += 1,
            WithdrawalStatus::Paid => counts.paid += 1,
            WithdrawalStatus::Rejected => counts.rejected += 1,
        }
        counts
    })
}

/// 最近 N 个月的 YYYY-MM，从早到晚
fn month_keys(now: DateTime<Utc>, months: u32) -> Vec<String> {
    (0..months)
        .rev()
        .filter_map(|back| now.checked_sub_months(Months::new(back)))
        .map(|date| date.format("%Y-%m").to_string())
        .collect()
}

fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// 保留一位小数的百分比
fn percentage(part: u64, total: u64) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * Decimal::from(100) / Decimal::from(total)).round_dp(1)
}

#[derive(Clone)]
pub struct DashboardService {
    database: Arc<Database>,
}

impl DashboardService {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl DashboardServiceTrait for DashboardService {
    async fn stats(&self) -> AppResult<DashboardStats> {
        let staff = self.database.find_staff(&StaffQuery::default()).await?;
        let referrals: ReferralStats = self.database.referral_stats(None).await?;
        let withdrawals = self.database.find_withdrawals(&WithdrawalQuery::default()).await?;
        let settings = self.database.get_settings().await?;

        let active = staff.iter().filter(|u| u.is_active).count() as u64;
        let total_paid_amount = withdrawals
            .iter()
            .filter(|w| w.status == WithdrawalStatus::Paid)
            .map(|w| w.amount)
            .sum();

        Ok(DashboardStats {
            users: UserCounts {
                total: staff.len() as u64,
                active,
                inactive: staff.len() as u64 - active,
            },
            referrals,
            withdrawals: withdrawal_counts(&withdrawals),
            total_points: staff.iter().map(|u| u.points_balance).sum(),
            total_paid_amount,
            currency: settings.currency,
        })
    }

    async fn charts(&self) -> AppResult<DashboardCharts> {
        let staff = self.database.find_staff(&StaffQuery::default()).await?;
        let referrals = self.database.find_referrals(&ReferralQuery::default()).await?;
        let withdrawals = self.database.find_withdrawals(&WithdrawalQuery::default()).await?;

        let months = month_keys(Utc::now(), CHART_MONTHS);

        let mut referral_buckets: BTreeMap<String, u64> = months.iter().map(|m| (m.clone(), 0)).collect();
        for referral in &referrals {
            if let Some(count) = referral_buckets.get_mut(&month_key(referral.created_at)) {
                *count += 1;
            }
        }

        let mut paid_buckets: BTreeMap<String, Decimal> = months.iter().map(|m| (m.clone(), Decimal::ZERO)).collect();
        for withdrawal in withdrawals.iter().filter(|w| w.status == WithdrawalStatus::Paid) {
            let paid_at = withdrawal.processed_at.unwrap_or(withdrawal.created_at);
            if let Some(amount) = paid_buckets.get_mut(&month_key(paid_at)) {
                *amount += withdrawal.amount;
            }
        }

        let mut performers: Vec<_> = staff.iter().collect();
        performers.sort_by(|a, b| {
            b.successful_referrals
                .cmp(&a.successful_referrals)
                .then(b.total_referrals.cmp(&a.total_referrals))
                .then(a.id.cmp(&b.id))
        });
        let top_performers = performers
            .into_iter()
            .take(TOP_PERFORMERS)
            .map(|u| TopPerformer {
                user_id: u.id,
                name: u.full_name(),
                department: u.department.clone(),
                successful_referrals: u.successful_referrals,
                total_referrals: u.total_referrals,
                points_balance: u.points_balance,
            })
            .collect();

        let mut by_department: BTreeMap<&str, u64> = BTreeMap::new();
        for user in &staff {
            *by_department.entry(user.department.as_str()).or_default() += 1;
        }
        let mut departments: Vec<DepartmentShare> = by_department
            .into_iter()
            .map(|(department, count)| DepartmentShare {
                department: department.to_string(),
                count,
                percentage: percentage(count, staff.len() as u64),
            })
            .collect();
        departments.sort_by(|a, b| b.count.cmp(&a.count).then(a.department.cmp(&b.department)));

        Ok(DashboardCharts {
            referrals_by_month: referral_buckets
                .into_iter()
                .map(|(month, count)| MonthlyCount { month, count })
                .collect(),
            paid_by_month: paid_buckets
                .into_iter()
                .map(|(month, amount)| MonthlyAmount { month, amount })
                .collect(),
            top_performers,
            departments,
        })
    }

    async fn recent(&self) -> AppResult<Vec<ActivityItem>> {
        let referrals = self.database.find_referrals(&ReferralQuery::default()).await?;
        let withdrawals = self.database.find_withdrawals(&WithdrawalQuery::default()).await?;

        let mut items: Vec<ActivityItem> = referrals
            .iter()
            .map(|r| ActivityItem {
                id: format!("ref-{}", r.id),
                kind: ActivityKind::Referral,
                message: format!("{} referred {}", r.referrer_name, r.referee_name),
                status: r.status.to_string(),
                timestamp: r.created_at,
            })
            .chain(withdrawals.iter().map(|w| ActivityItem {
                id: format!("withdrawal-{}", w.id),
                kind: ActivityKind::Withdrawal,
                message: format!("{} requested withdrawal of {} {}", w.user_name, w.currency, w.amount),
                status: w.status.to_string(),
                timestamp: w.created_at,
            }))
            .collect();

        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        items.truncate(RECENT_ACTIVITY);
        Ok(items)
    }

    async fn alerts(&self) -> AppResult<Vec<DashboardAlert>> {
        let pending_withdrawals = self
            .database
            .find_withdrawals(&WithdrawalQuery {
                status: Some(WithdrawalStatus::Pending),
                ..Default::default()
            })
            .await?
            .len() as u64;
        let pending_referrals = self.database.referral_stats(None).await?.pending;
        let active_users = self
            .database
            .find_staff(&StaffQuery {
                is_active: Some(true),
                ..Default::default()
            })
            .await?
            .len() as u64;

        Ok(vec![
            DashboardAlert {
                id: 1,
                level: AlertLevel::Warning,
                title: "Pending Withdrawals".to_string(),
                message: format!("{} withdrawals pending approval", pending_withdrawals),
                count: pending_withdrawals,
                link: "/admin/withdrawals?status=pending".to_string(),
            },
            DashboardAlert {
                id: 2,
                level: AlertLevel::Info,
                title: "Pending Referrals".to_string(),
                message: format!("{} referrals awaiting review", pending_referrals),
                count: pending_referrals,
                link: "/admin/referrals?status=pending".to_string(),
            },
            DashboardAlert {
                id: 3,
                level: AlertLevel::Success,
                title: "Active Users".to_string(),
                message: format!("{} users currently active", active_users),
                count: active_users,
                link: "/admin/users?status=active".to_string(),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_keys_cross_year() {
        let now = Utc.with_ymd_and_hms(2026, 2, 15, 0, 0, 0).unwrap();
        let keys = month_keys(now, 4);
        assert_eq!(keys, vec!["2025-11", "2025-12", "2026-01", "2026-02"]);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), Decimal::new(333, 1));
        assert_eq!(percentage(0, 0), Decimal::ZERO);
        assert_eq!(percentage(20, 50), Decimal::from(40));
    }

    #[tokio::test]
    async fn test_stats_are_consistent_with_store() {
        let service = DashboardService::new(Arc::new(Database::new_for_test().await));
        let stats = service.stats().await.unwrap();

        assert_eq!(stats.users.total, 50);
        assert_eq!(stats.users.active + stats.users.inactive, 50);
        assert_eq!(
            stats.referrals.total,
            stats.referrals.pending + stats.referrals.approved + stats.referrals.completed + stats.referrals.rejected
        );
        assert_eq!(
            stats.withdrawals.total,
            stats.withdrawals.pending
                + stats.withdrawals.approved
                + stats.withdrawals.processing
                + stats.withdrawals.paid
                + stats.withdrawals.rejected
        );
        assert_eq!(stats.currency, "NGN");
    }

    #[tokio::test]
    async fn test_charts_and_recent_activity() {
        let service = DashboardService::new(Arc::new(Database::new_for_test().await));

        let charts = service.charts().await.unwrap();
        assert_eq!(charts.referrals_by_month.len(), 12);
        assert_eq!(charts.paid_by_month.len(), 12);
        assert_eq!(charts.top_performers.len(), 10);
        assert!(charts
            .top_performers
            .windows(2)
            .all(|w| w[0].successful_referrals >= w[1].successful_referrals));
        assert_eq!(charts.departments[0].department, "Sales");
        assert_eq!(charts.departments[0].percentage, Decimal::from(40));

        let recent = service.recent().await.unwrap();
        assert_eq!(recent.len(), 10);
        assert!(recent.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_alerts_link_to_filtered_lists() {
        let service = DashboardService::new(Arc::new(Database::new_for_test().await));
        let alerts = service.alerts().await.unwrap();

        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
        assert_eq!(alerts[2].count, 44);
    }
}
