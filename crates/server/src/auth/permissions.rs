use crate::auth::AuthUser;
use database::admin::model::{normalize_permissions, AdminPermission, AdminRole, AdminUser};
use std::collections::{HashMap, HashSet};

/// 权限管理器
#[derive(Debug, Clone)]
pub struct PermissionManager {
    role_permissions: HashMap<AdminRole, HashSet<AdminPermission>>,
}

impl Default for PermissionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionManager {
    pub fn new() -> Self {
        let mut manager = Self {
            role_permissions: HashMap::new(),
        };

        manager.initialize_default_permissions();
        manager
    }

    /// 初始化默认的角色权限
    fn initialize_default_permissions(&mut self) {
        for role in [
            AdminRole::SuperAdmin,
            AdminRole::FinanceAdmin,
            AdminRole::OperationsAdmin,
            AdminRole::Manager,
            AdminRole::ReadOnly,
        ] {
            self.role_permissions
                .insert(role, role.default_permissions().into_iter().collect());
        }
    }

    pub fn role_permissions(&self, role: AdminRole) -> HashSet<AdminPermission> {
        self.role_permissions.get(&role).cloned().unwrap_or_default()
    }

    /// 账号的生效权限：超级管理员拥有全部，其余为显式授权
    pub fn effective_permissions(&self, admin: &AdminUser) -> Vec<AdminPermission> {
        if admin.role == AdminRole::SuperAdmin {
            return AdminPermission::all().to_vec();
        }
        normalize_permissions(admin.permissions.clone())
    }

    /// 写入令牌的权限字符串
    pub fn token_permissions(&self, admin: &AdminUser) -> Vec<String> {
        self.effective_permissions(admin)
            .iter()
            .map(|p| p.as_str().to_string())
            .collect()
    }

    /// 创建/修改账号时未显式给出权限则使用角色默认值
    pub fn resolve_permissions(&self, role: AdminRole, explicit: Option<Vec<AdminPermission>>) -> Vec<AdminPermission> {
        match explicit {
            Some(permissions) => normalize_permissions(permissions),
            None => normalize_permissions(self.role_permissions(role).into_iter().collect()),
        }
    }

    pub fn check_permission(&self, user: &AuthUser, permission: AdminPermission) -> bool {
        user.is_admin() && user.has_permission(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn admin(role: AdminRole, permissions: Vec<AdminPermission>) -> AdminUser {
        AdminUser {
            id: "admin-9".to_string(),
            name: "Test".to_string(),
            email: "test@company.com".to_string(),
            password_hash: String::new(),
            role,
            permissions,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_role_defaults() {
        let manager = PermissionManager::new();

        let read_only = manager.role_permissions(AdminRole::ReadOnly);
        assert!(read_only.contains(&AdminPermission::ViewUsers));
        assert!(!read_only.contains(&AdminPermission::EditUsers));

        assert_eq!(
            manager.role_permissions(AdminRole::SuperAdmin).len(),
            AdminPermission::all().len()
        );
    }

    #[test]
    fn test_effective_permissions() {
        let manager = PermissionManager::new();

        let super_admin = admin(AdminRole::SuperAdmin, vec![]);
        assert_eq!(manager.effective_permissions(&super_admin).len(), AdminPermission::all().len());

        let finance = admin(
            AdminRole::FinanceAdmin,
            vec![AdminPermission::ExportData, AdminPermission::ViewUsers, AdminPermission::ExportData],
        );
        assert_eq!(
            manager.token_permissions(&finance),
            vec!["view_users".to_string(), "export_data".to_string()]
        );
    }

    #[test]
    fn test_resolve_permissions() {
        let manager = PermissionManager::new();

        let defaults = manager.resolve_permissions(AdminRole::Manager, None);
        assert!(defaults.contains(&AdminPermission::ApproveWithdrawals));

        let explicit = manager.resolve_permissions(AdminRole::Manager, Some(vec![AdminPermission::ViewAuditLogs]));
        assert_eq!(explicit, vec![AdminPermission::ViewAuditLogs]);
    }
}
