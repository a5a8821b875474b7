use chrono::prelude::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// 管理员角色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    FinanceAdmin,
    OperationsAdmin,
    Manager,
    ReadOnly,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::FinanceAdmin => "finance_admin",
            AdminRole::OperationsAdmin => "operations_admin",
            AdminRole::Manager => "manager",
            AdminRole::ReadOnly => "read_only",
        }
    }

    /// 角色的默认权限集合
    pub fn default_permissions(&self) -> Vec<AdminPermission> {
        use AdminPermission::*;

        match self {
            AdminRole::SuperAdmin => AdminPermission::all().to_vec(),
            AdminRole::FinanceAdmin => vec![
                ViewUsers,
                ViewWithdrawals,
                ApproveWithdrawals,
                AdjustPoints,
                ManageRates,
                ExportData,
                AccessReports,
            ],
            AdminRole::OperationsAdmin => vec![
                ViewUsers,
                EditUsers,
                ViewReferrals,
                ManageReferrals,
                ViewWithdrawals,
                AccessReports,
                ViewAuditLogs,
            ],
            AdminRole::Manager => vec![
                ViewUsers,
                ViewReferrals,
                ViewWithdrawals,
                ApproveWithdrawals,
                AccessReports,
            ],
            AdminRole::ReadOnly => vec![ViewUsers, ViewReferrals, ViewWithdrawals, AccessReports],
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(AdminRole::SuperAdmin),
            "finance_admin" => Ok(AdminRole::FinanceAdmin),
            "operations_admin" => Ok(AdminRole::OperationsAdmin),
            "manager" => Ok(AdminRole::Manager),
            "read_only" | "analyst" => Ok(AdminRole::ReadOnly),
            other => Err(format!("Unknown admin role: {}", other)),
        }
    }
}

/// 管理后台细粒度权限
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AdminPermission {
    ViewUsers,
    EditUsers,
    DeleteUsers,
    ViewReferrals,
    ManageReferrals,
    ViewWithdrawals,
    ApproveWithdrawals,
    AdjustPoints,
    ManageRates,
    ExportData,
    AccessReports,
    ViewAuditLogs,
    ManageSettings,
}

impl AdminPermission {
    pub fn all() -> &'static [AdminPermission] {
        use AdminPermission::*;

        &[
            ViewUsers,
            EditUsers,
            DeleteUsers,
            ViewReferrals,
            ManageReferrals,
            ViewWithdrawals,
            ApproveWithdrawals,
            AdjustPoints,
            ManageRates,
            ExportData,
            AccessReports,
            ViewAuditLogs,
            ManageSettings,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminPermission::ViewUsers => "view_users",
            AdminPermission::EditUsers => "edit_users",
            AdminPermission::DeleteUsers => "delete_users",
            AdminPermission::ViewReferrals => "view_referrals",
            AdminPermission::ManageReferrals => "manage_referrals",
            AdminPermission::ViewWithdrawals => "view_withdrawals",
            AdminPermission::ApproveWithdrawals => "approve_withdrawals",
            AdminPermission::AdjustPoints => "adjust_points",
            AdminPermission::ManageRates => "manage_rates",
            AdminPermission::ExportData => "export_data",
            AdminPermission::AccessReports => "access_reports",
            AdminPermission::ViewAuditLogs => "view_audit_logs",
            AdminPermission::ManageSettings => "manage_settings",
        }
    }
}

impl FromStr for AdminPermission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminPermission::all()
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown permission: {}", s))
    }
}

/// 管理员账号
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminUser {
    /// 形如 admin-1
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: AdminRole,
    pub permissions: Vec<AdminPermission>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl AdminUser {
    /// super_admin 拥有全部权限，与权限列表无关
    pub fn has_permission(&self, permission: AdminPermission) -> bool {
        self.role == AdminRole::SuperAdmin || self.permissions.contains(&permission)
    }
}

#[derive(Debug, Clone)]
pub struct NewAdminUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: AdminRole,
    pub permissions: Vec<AdminPermission>,
}

#[derive(Debug, Clone, Default)]
pub struct AdminUpdate {
    pub name: Option<String>,
    pub role: Option<AdminRole>,
    pub permissions: Option<Vec<AdminPermission>>,
    pub is_active: Option<bool>,
}

/// 排序去重，保持输出稳定
pub fn normalize_permissions(mut permissions: Vec<AdminPermission>) -> Vec<AdminPermission> {
    permissions.sort();
    permissions.dedup();
    permissions
}
