use database::{
    audit::model::AuditQuery,
    pagination::Pagination,
    report::model::{ReportSchedule, ReportType},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// 审计日志查询参数
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct AuditListQuery {
    /// 动作名子串
    pub action: Option<String>,
    pub admin_id: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl AuditListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }

    pub fn to_query(&self) -> AuditQuery {
        AuditQuery {
            action: self.action.clone(),
            admin_id: self.admin_id.clone().filter(|id| !id.is_empty()),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct CreateAuditLogRequest {
    #[validate(length(min = 1, max = 100))]
    pub action: String,
    #[validate(length(min = 1, max = 200))]
    pub target: String,
    #[validate(length(max = 1000))]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct ReportListQuery {
    #[serde(rename = "type")]
    pub kind: Option<ReportType>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct CreateReportRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ReportType,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub description: String,
    pub schedule: Option<ReportSchedule>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct ScheduleReportRequest {
    pub schedule: ReportSchedule,
}
