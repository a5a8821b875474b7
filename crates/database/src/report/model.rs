use chrono::{
    prelude::{DateTime, Utc},
    Duration, Months,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Referral,
    Withdrawal,
    Performance,
    Points,
    Custom,
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "referral" => Ok(ReportType::Referral),
            "withdrawal" => Ok(ReportType::Withdrawal),
            "performance" => Ok(ReportType::Performance),
            "points" => Ok(ReportType::Points),
            "custom" => Ok(ReportType::Custom),
            other => Err(format!("Unknown report type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportSchedule {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl ReportSchedule {
    /// 下一次运行时间；None 表示不调度
    pub fn next_run_after(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ReportSchedule::None => None,
            ReportSchedule::Daily => Some(from + Duration::days(1)),
            ReportSchedule::Weekly => Some(from + Duration::weeks(1)),
            ReportSchedule::Monthly => from.checked_add_months(Months::new(1)),
            ReportSchedule::Quarterly => from.checked_add_months(Months::new(3)),
        }
    }
}

impl fmt::Display for ReportSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportSchedule::None => "none",
            ReportSchedule::Daily => "daily",
            ReportSchedule::Weekly => "weekly",
            ReportSchedule::Monthly => "monthly",
            ReportSchedule::Quarterly => "quarterly",
        };
        f.write_str(name)
    }
}

/// 报表定义
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Report {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ReportType,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub schedule: ReportSchedule,
    pub next_run: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    pub kind: ReportType,
    pub description: String,
    pub created_by: String,
    pub schedule: ReportSchedule,
}
