use crate::{
    admin::model::{normalize_permissions, AdminUpdate, AdminUser, NewAdminUser},
    Database,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use utils::{AppError, AppResult};

pub type DynAdminRepository = Arc<dyn AdminRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait AdminRepositoryTrait {
    async fn list_admins(&self) -> AppResult<Vec<AdminUser>>;

    async fn get_admin(&self, id: &str) -> AppResult<AdminUser>;

    async fn find_admin_by_email(&self, email: &str) -> AppResult<Option<AdminUser>>;

    async fn create_admin(&self, admin: NewAdminUser) -> AppResult<AdminUser>;

    async fn update_admin(&self, id: &str, update: AdminUpdate) -> AppResult<AdminUser>;

    async fn touch_admin_login(&self, id: &str) -> AppResult<AdminUser>;

    async fn set_admin_password(&self, id: &str, password_hash: String) -> AppResult<()>;
}

fn admin_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Admin {} not found", id))
}

#[async_trait]
impl AdminRepositoryTrait for Database {
    async fn list_admins(&self) -> AppResult<Vec<AdminUser>> {
        Ok(self.admin_users.read().await.clone())
    }

    async fn get_admin(&self, id: &str) -> AppResult<AdminUser> {
        let admins = self.admin_users.read().await;
        admins.iter().find(|a| a.id == id).cloned().ok_or_else(|| admin_not_found(id))
    }

    async fn find_admin_by_email(&self, email: &str) -> AppResult<Option<AdminUser>> {
        let admins = self.admin_users.read().await;
        Ok(admins.iter().find(|a| a.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn create_admin(&self, admin: NewAdminUser) -> AppResult<AdminUser> {
        let mut admins = self.admin_users.write().await;

        if admins.iter().any(|a| a.email.eq_ignore_ascii_case(&admin.email)) {
            return Err(AppError::Conflict(format!(
                "Admin with email {} already exists",
                admin.email
            )));
        }

        let created = AdminUser {
            id: format!("admin-{}", self.admin_users.next_id()),
            name: admin.name,
            email: admin.email.to_lowercase(),
            password_hash: admin.password_hash,
            role: admin.role,
            permissions: normalize_permissions(admin.permissions),
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        };
        admins.push(created.clone());

        info!("👤 新建管理员 {} ({})", created.id, created.role);
        Ok(created)
    }

    async fn update_admin(&self, id: &str, update: AdminUpdate) -> AppResult<AdminUser> {
        let mut admins = self.admin_users.write().await;
        let admin = admins.iter_mut().find(|a| a.id == id).ok_or_else(|| admin_not_found(id))?;

        if let Some(name) = update.name {
            admin.name = name;
        }
        if let Some(role) = update.role {
            admin.role = role;
        }
        if let Some(permissions) = update.permissions {
            admin.permissions = normalize_permissions(permissions);
        }
        if let Some(is_active) = update.is_active {
            admin.is_active = is_active;
        }

        Ok(admin.clone())
    }

    async fn touch_admin_login(&self, id: &str) -> AppResult<AdminUser> {
        let mut admins = self.admin_users.write().await;
        let admin = admins.iter_mut().find(|a| a.id == id).ok_or_else(|| admin_not_found(id))?;

        admin.last_login = Some(Utc::now());
        Ok(admin.clone())
    }

    async fn set_admin_password(&self, id: &str, password_hash: String) -> AppResult<()> {
        let mut admins = self.admin_users.write().await;
        let admin = admins.iter_mut().find(|a| a.id == id).ok_or_else(|| admin_not_found(id))?;

        admin.password_hash = password_hash;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::model::{AdminPermission, AdminRole};

    #[tokio::test]
    async fn test_seeded_admins() {
        let db = Database::new_for_test().await;

        let admin = db.find_admin_by_email("ADMIN@company.com").await.unwrap().unwrap();
        assert_eq!(admin.id, "admin-1");
        assert_eq!(admin.role, AdminRole::SuperAdmin);
        assert!(admin.has_permission(AdminPermission::ManageSettings));
    }

    #[tokio::test]
    async fn test_create_admin_assigns_next_id_and_rejects_duplicates() {
        let db = Database::new_for_test().await;
        let existing = db.list_admins().await.unwrap().len();

        let new_admin = NewAdminUser {
            name: "Ops Person".to_string(),
            email: "ops2@company.com".to_string(),
            password_hash: String::new(),
            role: AdminRole::OperationsAdmin,
            permissions: AdminRole::OperationsAdmin.default_permissions(),
        };

        let created = db.create_admin(new_admin.clone()).await.unwrap();
        assert_eq!(created.id, format!("admin-{}", existing + 1));
        assert!(created.last_login.is_none());

        assert!(matches!(db.create_admin(new_admin).await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_touch_login() {
        let db = Database::new_for_test().await;
        let admin = db.touch_admin_login("admin-2").await.unwrap();
        assert!(admin.last_login.is_some());
        assert!(matches!(db.touch_admin_login("admin-99").await, Err(AppError::NotFound(_))));
    }
}
