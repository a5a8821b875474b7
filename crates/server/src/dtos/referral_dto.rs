use database::{
    pagination::Pagination,
    referral::model::{ReferralQuery, ReferralStatus},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// 管理端推荐列表查询参数
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct ReferralListQuery {
    pub status: Option<ReferralStatus>,
    pub user_id: Option<i64>,
    /// 按推荐人、被推荐人姓名或邮箱搜索
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ReferralListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }

    pub fn to_query(&self) -> ReferralQuery {
        ReferralQuery {
            status: self.status,
            user_id: self.user_id,
            search: self.search.clone(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct UpdateReferralStatusRequest {
    pub status: ReferralStatus,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// 员工端推荐筛选
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct StaffReferralQuery {
    pub status: Option<ReferralStatus>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct SendInviteRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// 被推荐人姓名，缺省时取邮箱前缀
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl SendInviteRequest {
    pub fn referee_name(&self) -> String {
        match self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => self.email.split('@').next().unwrap_or_default().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referee_name_falls_back_to_email() {
        let req = SendInviteRequest {
            email: "jane.doe@example.com".to_string(),
            name: None,
            phone: None,
            notes: None,
        };
        assert!(req.validate().is_ok());
        assert_eq!(req.referee_name(), "jane.doe");

        let named = SendInviteRequest {
            name: Some(" Jane Doe ".to_string()),
            ..req
        };
        assert_eq!(named.referee_name(), "Jane Doe");
    }

    #[test]
    fn test_status_query() {
        let query: ReferralListQuery = serde_urlencoded::from_str("status=approved&user_id=3&limit=5").unwrap();
        let referral_query = query.to_query();

        assert_eq!(referral_query.status, Some(ReferralStatus::Approved));
        assert_eq!(referral_query.user_id, Some(3));
        assert_eq!(query.pagination().limit, 5);
        assert!(serde_urlencoded::from_str::<ReferralListQuery>("status=paid").is_err());
    }
}
