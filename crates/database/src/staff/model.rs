use chrono::prelude::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use utoipa::ToSchema;

use crate::pagination::SortOrder;

/// 员工（推荐人）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// 永不输出
    #[serde(skip)]
    pub password_hash: String,
    pub referral_code: String,
    pub department: String,
    pub position: String,
    pub location: String,
    pub join_date: NaiveDate,
    pub is_active: bool,
    /// 总积分（包含冻结部分）
    pub points_balance: i64,
    /// 冻结积分，不可提现
    pub frozen_points: i64,
    pub total_referrals: i64,
    pub successful_referrals: i64,
    pub avatar: String,
    pub hours: StaffHours,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StaffUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// 可用积分 = 总积分 - 冻结积分
    pub fn available_points(&self) -> i64 {
        (self.points_balance - self.frozen_points).max(0)
    }
}

/// 工时汇总
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StaffHours {
    pub current_month: u32,
    pub last_month: u32,
    pub year_to_date: u32,
}

impl Default for StaffHours {
    fn default() -> Self {
        Self {
            current_month: 160,
            last_month: 168,
            year_to_date: 1920,
        }
    }
}

/// 部分更新，None 字段保持不变
#[derive(Debug, Clone, Default)]
pub struct StaffUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
}

impl StaffUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.department.is_none()
            && self.position.is_none()
            && self.location.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StaffSortField {
    Id,
    FirstName,
    LastName,
    Email,
    Department,
    Location,
    JoinDate,
    PointsBalance,
    TotalReferrals,
    SuccessfulReferrals,
}

impl StaffSortField {
    pub fn compare(&self, a: &StaffUser, b: &StaffUser) -> Ordering {
        match self {
            StaffSortField::Id => a.id.cmp(&b.id),
            StaffSortField::FirstName => a.first_name.cmp(&b.first_name),
            StaffSortField::LastName => a.last_name.cmp(&b.last_name),
            StaffSortField::Email => a.email.cmp(&b.email),
            StaffSortField::Department => a.department.cmp(&b.department),
            StaffSortField::Location => a.location.cmp(&b.location),
            StaffSortField::JoinDate => a.join_date.cmp(&b.join_date),
            StaffSortField::PointsBalance => a.points_balance.cmp(&b.points_balance),
            StaffSortField::TotalReferrals => a.total_referrals.cmp(&b.total_referrals),
            StaffSortField::SuccessfulReferrals => a.successful_referrals.cmp(&b.successful_referrals),
        }
    }
}

/// 员工列表查询条件
#[derive(Debug, Clone, Default)]
pub struct StaffQuery {
    /// 匹配姓、名、邮箱、推荐码
    pub search: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
    pub sort_by: Option<StaffSortField>,
    pub sort_order: SortOrder,
}

impl StaffQuery {
    pub fn matches(&self, user: &StaffUser) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let search = search.to_lowercase();
            let hit = [&user.first_name, &user.last_name, &user.email, &user.referral_code]
                .iter()
                .any(|field| field.to_lowercase().contains(&search));
            if !hit {
                return false;
            }
        }

        if let Some(department) = &self.department {
            if !user.department.eq_ignore_ascii_case(department) {
                return false;
            }
        }

        if let Some(location) = &self.location {
            if !user.location.eq_ignore_ascii_case(location) {
                return false;
            }
        }

        self.is_active.map_or(true, |active| user.is_active == active)
    }
}
