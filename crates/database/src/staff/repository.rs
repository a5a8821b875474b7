use crate::{
    staff::model::{StaffQuery, StaffUpdate, StaffUser},
    Database,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use utils::{AppError, AppResult};

pub type DynStaffRepository = Arc<dyn StaffRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait StaffRepositoryTrait {
    /// 过滤 + 排序后的全部结果（分页由调用方处理）
    async fn find_staff(&self, query: &StaffQuery) -> AppResult<Vec<StaffUser>>;

    async fn get_staff(&self, id: i64) -> AppResult<StaffUser>;

    async fn find_staff_by_email(&self, email: &str) -> AppResult<Option<StaffUser>>;

    async fn update_staff(&self, id: i64, update: StaffUpdate) -> AppResult<StaffUser>;

    async fn set_staff_active(&self, id: i64, is_active: bool) -> AppResult<StaffUser>;

    /// 存在未完结提现时拒绝删除；检查与删除在同一组写锁内完成
    async fn delete_staff(&self, id: i64) -> AppResult<StaffUser>;

    async fn set_staff_password(&self, id: i64, password_hash: String) -> AppResult<()>;

    /// 推荐码全局唯一
    async fn set_referral_code(&self, id: i64, referral_code: String) -> AppResult<StaffUser>;

    async fn set_staff_avatar(&self, id: i64, avatar: String) -> AppResult<StaffUser>;
}

fn staff_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

#[async_trait]
impl StaffRepositoryTrait for Database {
    async fn find_staff(&self, query: &StaffQuery) -> AppResult<Vec<StaffUser>> {
        let staff = self.staff_users.read().await;

        let mut filtered: Vec<StaffUser> = staff.iter().filter(|u| query.matches(u)).cloned().collect();

        if let Some(field) = query.sort_by {
            filtered.sort_by(|a, b| query.sort_order.apply(field.compare(a, b)));
        }

        Ok(filtered)
    }

    async fn get_staff(&self, id: i64) -> AppResult<StaffUser> {
        let staff = self.staff_users.read().await;
        staff.iter().find(|u| u.id == id).cloned().ok_or_else(staff_not_found)
    }

    async fn find_staff_by_email(&self, email: &str) -> AppResult<Option<StaffUser>> {
        let staff = self.staff_users.read().await;
        Ok(staff.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn update_staff(&self, id: i64, update: StaffUpdate) -> AppResult<StaffUser> {
        let mut staff = self.staff_users.write().await;

        if let Some(email) = &update.email {
            if staff.iter().any(|u| u.id != id && u.email.eq_ignore_ascii_case(email)) {
                return Err(AppError::Conflict(format!("Email {} is already in use", email)));
            }
        }

        let user = staff.iter_mut().find(|u| u.id == id).ok_or_else(staff_not_found)?;

        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = update.email {
            user.email = email.to_lowercase();
        }
        if let Some(phone) = update.phone {
            user.phone = phone;
        }
        if let Some(department) = update.department {
            user.department = department;
        }
        if let Some(position) = update.position {
            user.position = position;
        }
        if let Some(location) = update.location {
            user.location = location;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn set_staff_active(&self, id: i64, is_active: bool) -> AppResult<StaffUser> {
        let mut staff = self.staff_users.write().await;
        let user = staff.iter_mut().find(|u| u.id == id).ok_or_else(staff_not_found)?;

        user.is_active = is_active;
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete_staff(&self, id: i64) -> AppResult<StaffUser> {
        // 锁顺序与创建提现一致: staff -> withdrawals
        let mut staff = self.staff_users.write().await;
        let withdrawals = self.withdrawals.write().await;

        let index = staff.iter().position(|u| u.id == id).ok_or_else(staff_not_found)?;
        let open = withdrawals.iter().filter(|w| w.user_id == id && w.status.is_open()).count();
        if open > 0 {
            return Err(AppError::Conflict(format!(
                "User has {} open withdrawal(s); resolve them before deleting",
                open
            )));
        }

        let removed = staff.remove(index);

        info!("🗑️ 删除员工 {} ({})", removed.id, removed.email);
        Ok(removed)
    }

    async fn set_staff_password(&self, id: i64, password_hash: String) -> AppResult<()> {
        let mut staff = self.staff_users.write().await;
        let user = staff.iter_mut().find(|u| u.id == id).ok_or_else(staff_not_found)?;

        user.password_hash = password_hash;
        user.updated_at = Utc::now();

        Ok(())
    }

    async fn set_referral_code(&self, id: i64, referral_code: String) -> AppResult<StaffUser> {
        let mut staff = self.staff_users.write().await;

        if staff.iter().any(|u| u.id != id && u.referral_code == referral_code) {
            return Err(AppError::Conflict(format!("Referral code {} is already taken", referral_code)));
        }

        let user = staff.iter_mut().find(|u| u.id == id).ok_or_else(staff_not_found)?;
        user.referral_code = referral_code;
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn set_staff_avatar(&self, id: i64, avatar: String) -> AppResult<StaffUser> {
        let mut staff = self.staff_users.write().await;
        let user = staff.iter_mut().find(|u| u.id == id).ok_or_else(staff_not_found)?;

        user.avatar = avatar;
        user.updated_at = Utc::now();

        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pagination::SortOrder, staff::model::StaffSortField};

    #[tokio::test]
    async fn test_search_matches_name_email_and_code() {
        let db = Database::new_for_test().await;

        let by_name = db
            .find_staff(&StaffQuery {
                search: Some("adewale".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].email, "adewale.johnson@company.com");

        let by_code = db
            .find_staff(&StaffQuery {
                search: Some("refax9k01".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_code.len(), 1);
    }

    #[tokio::test]
    async fn test_filters_and_sorting() {
        let db = Database::new_for_test().await;

        let sales = db
            .find_staff(&StaffQuery {
                department: Some("Sales".to_string()),
                sort_by: Some(StaffSortField::PointsBalance),
                sort_order: SortOrder::Desc,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(sales.len(), 20);
        assert!(sales.windows(2).all(|w| w[0].points_balance >= w[1].points_balance));

        let inactive = db
            .find_staff(&StaffQuery {
                is_active: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(inactive.iter().all(|u| !u.is_active));
        assert!(!inactive.is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_duplicate_email() {
        let db = Database::new_for_test().await;

        let result = db
            .update_staff(
                1,
                StaffUpdate {
                    email: Some("chioma.okafor@company.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let updated = db
            .update_staff(
                1,
                StaffUpdate {
                    position: Some("Lead".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.position, "Lead");
        assert_eq!(updated.first_name, "Adewale");
    }

    async fn open_withdrawal_users(db: &Database) -> Vec<i64> {
        db.withdrawals
            .read()
            .await
            .iter()
            .filter(|w| w.status.is_open())
            .map(|w| w.user_id)
            .collect()
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let db = Database::new_for_test().await;
        let busy = open_withdrawal_users(&db).await;
        let id = (1..=50).find(|id| !busy.contains(id)).unwrap();

        db.delete_staff(id).await.unwrap();
        assert!(matches!(db.get_staff(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(db.delete_staff(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_with_open_withdrawal_is_conflict() {
        let db = Database::new_for_test().await;
        let id = open_withdrawal_users(&db).await[0];

        assert!(matches!(db.delete_staff(id).await, Err(AppError::Conflict(_))));
        assert!(db.get_staff(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_referral_code_must_be_unique() {
        let db = Database::new_for_test().await;
        let other = db.get_staff(2).await.unwrap();

        let result = db.set_referral_code(1, other.referral_code).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let user = db.set_referral_code(1, "REFZZZZZZ".to_string()).await.unwrap();
        assert_eq!(user.referral_code, "REFZZZZZZ");
    }
}
