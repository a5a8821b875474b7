use database::{
    pagination::{Pagination, SortOrder},
    referral::model::ReferralStats,
    staff::model::{StaffQuery, StaffSortField, StaffUpdate, StaffUser},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// 账号状态筛选
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserStatusFilter {
    All,
    Active,
    Inactive,
}

/// 员工列表查询参数
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct UserListQuery {
    /// 按姓名、邮箱、推荐码模糊搜索
    pub search: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub status: Option<UserStatusFilter>,
    pub sort_by: Option<StaffSortField>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl UserListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }

    pub fn to_query(&self) -> StaffQuery {
        StaffQuery {
            search: self.search.clone(),
            department: self.department.clone().filter(|d| !d.is_empty() && d != "all"),
            location: self.location.clone().filter(|l| !l.is_empty() && l != "all"),
            is_active: match self.status {
                Some(UserStatusFilter::Active) => Some(true),
                Some(UserStatusFilter::Inactive) => Some(false),
                Some(UserStatusFilter::All) | None => None,
            },
            sort_by: self.sort_by,
            sort_order: self.sort_order.unwrap_or_default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub department: Option<String>,
    #[validate(length(min = 1, max = 80))]
    pub position: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub location: Option<String>,
}

impl From<UpdateUserRequest> for StaffUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        StaffUpdate {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            department: req.department,
            position: req.position,
            location: req.location,
        }
    }
}

/// 员工详情
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDetail {
    pub user: StaffUser,
    pub available_points: i64,
    pub referral_stats: ReferralStats,
    pub open_withdrawals: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_from_url() {
        let query: UserListQuery =
            serde_urlencoded::from_str("search=ade&status=inactive&sort_by=points_balance&sort_order=asc&page=2")
                .unwrap();
        let staff_query = query.to_query();

        assert_eq!(staff_query.search.as_deref(), Some("ade"));
        assert_eq!(staff_query.is_active, Some(false));
        assert_eq!(staff_query.sort_by, Some(StaffSortField::PointsBalance));
        assert_eq!(staff_query.sort_order, SortOrder::Asc);
        assert_eq!(query.pagination().page, 2);
        assert_eq!(query.pagination().limit, 10);
    }

    #[test]
    fn test_department_all_means_no_filter() {
        let query = UserListQuery {
            department: Some("all".to_string()),
            ..Default::default()
        };
        assert_eq!(query.to_query().department, None);
    }

    #[test]
    fn test_update_validation() {
        let req = UpdateUserRequest {
            email: Some("broken".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = UpdateUserRequest {
            department: Some("Finance".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }
}
