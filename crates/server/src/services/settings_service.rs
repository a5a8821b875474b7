use crate::{
    auth::PermissionManager,
    dtos::{
        auth_dto::AdminSummary,
        points_dto::AdjustmentKind,
        settings_dto::{
            CreateAdminRequest, OverrideRequest, OverrideResponse, UpdateAdminRequest, UpdateFeaturesRequest,
            UpdateWithdrawalLimitsRequest, MIN_OVERRIDE_REASON_LENGTH,
        },
    },
    extractors::Actor,
    services::{activity, points_service::adjustment_change},
};
use async_trait::async_trait;
use database::{
    admin::{
        model::{AdminUpdate, AdminUser, NewAdminUser},
        repository::AdminRepositoryTrait,
    },
    overrides::{
        model::{NewOverrideRecord, OverrideAction, OverrideRecord},
        repository::OverrideRepositoryTrait,
    },
    points::repository::PointsRepositoryTrait,
    settings::{
        model::{FeatureFlagsPatch, SystemSettings},
        repository::{SettingsRepositoryTrait, SettingsUpdate},
    },
    staff::repository::StaffRepositoryTrait,
    withdrawal::{
        model::{WithdrawalStatus, WithdrawalTransition},
        repository::WithdrawalRepositoryTrait,
    },
    Database,
};
use std::sync::Arc;
use tracing::{info, warn};
use utils::{AppError, AppResult, PasswordHasher};

pub type DynSettingsService = Arc<dyn SettingsServiceTrait + Send + Sync>;

/// 系统设置、超级管理员越权操作、管理员账号
#[async_trait]
pub trait SettingsServiceTrait {
    async fn get_settings(&self) -> AppResult<SystemSettings>;

    async fn update_timezone(&self, actor: &Actor, timezone: String) -> AppResult<SystemSettings>;

    async fn update_currency(&self, actor: &Actor, currency: String) -> AppResult<SystemSettings>;

    async fn update_features(&self, actor: &Actor, request: UpdateFeaturesRequest) -> AppResult<SystemSettings>;

    async fn update_retention(&self, actor: &Actor, days: u32) -> AppResult<SystemSettings>;

    async fn update_withdrawal_limits(
        &self,
        actor: &Actor,
        request: UpdateWithdrawalLimitsRequest,
    ) -> AppResult<SystemSettings>;

    async fn perform_override(&self, actor: &Actor, request: OverrideRequest) -> AppResult<OverrideResponse>;

    async fn list_overrides(&self) -> AppResult<Vec<OverrideRecord>>;

    async fn list_admins(&self) -> AppResult<Vec<AdminSummary>>;

    async fn create_admin(&self, actor: &Actor, request: CreateAdminRequest) -> AppResult<AdminSummary>;

    async fn update_admin(&self, actor: &Actor, id: &str, request: UpdateAdminRequest) -> AppResult<AdminSummary>;
}

fn require_super_admin(actor: &Actor) -> AppResult<()> {
    if actor.user.is_super_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Super admin access required".to_string()))
    }
}

fn parse_resource_id(resource_id: &str) -> AppResult<i64> {
    resource_id
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid resource id: {}", resource_id)))
}

#[derive(Clone)]
pub struct SettingsService {
    database: Arc<Database>,
    permissions: Arc<PermissionManager>,
}

impl SettingsService {
    pub fn new(database: Arc<Database>, permissions: Arc<PermissionManager>) -> Self {
        Self { database, permissions }
    }

    async fn apply(
        &self,
        actor: &Actor,
        description: String,
        apply: SettingsUpdate,
    ) -> AppResult<SystemSettings> {
        let settings = self.database.update_settings(apply).await?;
        activity::record_audit(&self.database, actor, "Settings updated", "System settings", description).await?;
        Ok(settings)
    }

    async fn admin_name(&self, actor: &Actor) -> String {
        match self.database.get_admin(&actor.user.subject).await {
            Ok(admin) => admin.name,
            Err(_) => actor.user.subject.clone(),
        }
    }

    fn summary(&self, admin: &AdminUser) -> AdminSummary {
        AdminSummary::new(admin, self.permissions.effective_permissions(admin))
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    async fn get_settings(&self) -> AppResult<SystemSettings> {
        self.database.get_settings().await
    }

    async fn update_timezone(&self, actor: &Actor, timezone: String) -> AppResult<SystemSettings> {
        let description = format!("Timezone set to {}", timezone);
        self.apply(
            actor,
            description,
            Box::new(move |settings| {
                settings.timezone = timezone;
                Ok(())
            }),
        )
        .await
    }

    async fn update_currency(&self, actor: &Actor, currency: String) -> AppResult<SystemSettings> {
        let description = format!("Currency set to {}", currency);
        self.apply(
            actor,
            description,
            Box::new(move |settings| {
                settings.currency = currency;
                Ok(())
            }),
        )
        .await
    }

    async fn update_features(&self, actor: &Actor, request: UpdateFeaturesRequest) -> AppResult<SystemSettings> {
        let patch: FeatureFlagsPatch = request.into();
        self.apply(
            actor,
            format!("Feature flags updated: {:?}", patch),
            Box::new(move |settings| {
                settings.features.merge(patch);
                Ok(())
            }),
        )
        .await
    }

    async fn update_retention(&self, actor: &Actor, days: u32) -> AppResult<SystemSettings> {
        if !(1..=3650).contains(&days) {
            return Err(AppError::BadRequest(
                "Retention must be between 1 and 3650 days".to_string(),
            ));
        }
        self.apply(
            actor,
            format!("Data retention set to {} days", days),
            Box::new(move |settings| {
                settings.retention_days = days;
                Ok(())
            }),
        )
        .await
    }

    async fn update_withdrawal_limits(
        &self,
        actor: &Actor,
        request: UpdateWithdrawalLimitsRequest,
    ) -> AppResult<SystemSettings> {
        let UpdateWithdrawalLimitsRequest { minimum, maximum } = request;
        self.apply(
            actor,
            format!("Withdrawal limits set to {} - {}", minimum, maximum),
            Box::new(move |settings| {
                if minimum >= maximum {
                    return Err(AppError::BadRequest(
                        "Minimum withdrawal must be less than maximum withdrawal".to_string(),
                    ));
                }
                settings.minimum_withdrawal = minimum;
                settings.maximum_withdrawal = maximum;
                Ok(())
            }),
        )
        .await
    }

    async fn perform_override(&self, actor: &Actor, request: OverrideRequest) -> AppResult<OverrideResponse> {
        require_super_admin(actor)?;

        let reason = request.reason.trim().to_string();
        if reason.chars().count() < MIN_OVERRIDE_REASON_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Reason must be at least {} characters",
                MIN_OVERRIDE_REASON_LENGTH
            )));
        }

        let admin_name = self.admin_name(actor).await;
        let mut withdrawal = None;
        let mut user = None;
        let mut transaction = None;

        let description = match request.action {
            OverrideAction::ForceApproveWithdrawal | OverrideAction::ForceRejectWithdrawal => {
                let id = parse_resource_id(&request.resource_id)?;
                let (status, rejection_reason) = match request.action {
                    OverrideAction::ForceApproveWithdrawal => (WithdrawalStatus::Approved, None),
                    _ => (WithdrawalStatus::Rejected, Some(reason.clone())),
                };
                let (updated, refund) = self
                    .database
                    .transition_withdrawal(
                        id,
                        WithdrawalTransition {
                            status,
                            processed_by: admin_name.clone(),
                            rejection_reason,
                            force: true,
                        },
                    )
                    .await?;
                let description = format!("Withdrawal {} forced to {}", updated.id, updated.status);
                withdrawal = Some(updated);
                transaction = refund;
                description
            }
            OverrideAction::PointsAdjustment => {
                let user_id = parse_resource_id(&request.resource_id)?;
                let points = request
                    .points
                    .filter(|p| *p != 0)
                    .ok_or_else(|| AppError::BadRequest("Points are required for a points adjustment".to_string()))?;
                let kind = if points > 0 {
                    AdjustmentKind::Add
                } else {
                    AdjustmentKind::Remove
                };
                let (adjusted, tx) = self
                    .database
                    .apply_points_change(adjustment_change(user_id, kind, points.abs(), &reason))
                    .await?;
                let description = format!("Adjusted {} points for {}", points, adjusted.full_name());
                user = Some(adjusted);
                transaction = Some(tx);
                description
            }
            OverrideAction::UserStatus => {
                let user_id = parse_resource_id(&request.resource_id)?;
                let is_active = match request.is_active {
                    Some(is_active) => is_active,
                    None => !self.database.get_staff(user_id).await?.is_active,
                };
                let updated = self.database.set_staff_active(user_id, is_active).await?;
                let description = format!(
                    "{} {}",
                    if is_active { "Activated" } else { "Deactivated" },
                    updated.full_name()
                );
                user = Some(updated);
                description
            }
        };

        let record = self
            .database
            .record_override(NewOverrideRecord {
                action: request.action,
                resource_id: request.resource_id.trim().to_string(),
                reason: reason.clone(),
                admin_id: actor.user.subject.clone(),
                admin_name,
            })
            .await?;

        activity::record_audit(
            &self.database,
            actor,
            &format!("Override: {}", request.action.as_str()),
            request.resource_id.trim(),
            format!("{}. Reason: {}", description, reason),
        )
        .await?;

        warn!("🚨 超级管理员 {} 执行越权操作 {}", actor.user.subject, request.action.as_str());
        Ok(OverrideResponse {
            record,
            withdrawal,
            user,
            transaction,
        })
    }

    async fn list_overrides(&self) -> AppResult<Vec<OverrideRecord>> {
        self.database.list_overrides().await
    }

    async fn list_admins(&self) -> AppResult<Vec<AdminSummary>> {
        let admins = self.database.list_admins().await?;
        Ok(admins.iter().map(|admin| self.summary(admin)).collect())
    }

    async fn create_admin(&self, actor: &Actor, request: CreateAdminRequest) -> AppResult<AdminSummary> {
        require_super_admin(actor)?;

        let password_hash = PasswordHasher::hash(&request.password)?;
        let permissions = self.permissions.resolve_permissions(request.role, request.permissions);

        let admin = self
            .database
            .create_admin(NewAdminUser {
                name: request.name.trim().to_string(),
                email: request.email.trim().to_string(),
                password_hash,
                role: request.role,
                permissions,
            })
            .await?;

        activity::record_audit(
            &self.database,
            actor,
            "Admin created",
            admin.id.clone(),
            format!("Created {} account for {}", admin.role, admin.email),
        )
        .await?;

        info!("👤 管理员 {} 创建了 {}", actor.user.subject, admin.id);
        Ok(self.summary(&admin))
    }

    async fn update_admin(&self, actor: &Actor, id: &str, request: UpdateAdminRequest) -> AppResult<AdminSummary> {
        require_super_admin(actor)?;

        if id == actor.user.subject && request.is_active == Some(false) {
            return Err(AppError::BadRequest("You cannot deactivate your own account".to_string()));
        }

        // 仅改角色时权限随角色默认值重置
        let permissions = match (request.role, request.permissions) {
            (_, Some(explicit)) => Some(explicit),
            (Some(role), None) => Some(self.permissions.resolve_permissions(role, None)),
            (None, None) => None,
        };

        let admin = self
            .database
            .update_admin(
                id,
                AdminUpdate {
                    name: request.name.map(|n| n.trim().to_string()),
                    role: request.role,
                    permissions,
                    is_active: request.is_active,
                },
            )
            .await?;

        activity::record_audit(
            &self.database,
            actor,
            "Admin updated",
            admin.id.clone(),
            format!("Updated {} ({}), active={}", admin.name, admin.role, admin.is_active),
        )
        .await?;

        Ok(self.summary(&admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{admin_actor, admin_actor_with_role};
    use database::{admin::model::AdminRole, withdrawal::model::WithdrawalQuery};
    use rust_decimal::Decimal;

    async fn service() -> (SettingsService, Arc<Database>) {
        let database = Arc::new(Database::new_for_test().await);
        (
            SettingsService::new(database.clone(), Arc::new(PermissionManager::new())),
            database,
        )
    }

    fn override_request(action: OverrideAction, resource_id: &str) -> OverrideRequest {
        OverrideRequest {
            action,
            resource_id: resource_id.to_string(),
            reason: "Approved by finance director after review".to_string(),
            points: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_feature_flags_merge_partially() {
        let (service, _) = service().await;
        let settings = service
            .update_features(
                &admin_actor("admin-1"),
                UpdateFeaturesRequest {
                    notifications: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!settings.features.notifications);
        assert!(settings.features.referral_system);
        assert!(settings.features.withdrawal_system);
    }

    #[tokio::test]
    async fn test_withdrawal_limits_must_be_ordered() {
        let (service, _) = service().await;
        let actor = admin_actor("admin-1");

        let err = service
            .update_withdrawal_limits(
                &actor,
                UpdateWithdrawalLimitsRequest {
                    minimum: Decimal::from(10_000),
                    maximum: Decimal::from(10_000),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(
            service.get_settings().await.unwrap().minimum_withdrawal,
            Decimal::from(5_000)
        );

        let settings = service
            .update_withdrawal_limits(
                &actor,
                UpdateWithdrawalLimitsRequest {
                    minimum: Decimal::from(2_000),
                    maximum: Decimal::from(50_000),
                },
            )
            .await
            .unwrap();
        assert_eq!(settings.maximum_withdrawal, Decimal::from(50_000));
    }

    #[tokio::test]
    async fn test_retention_bounds() {
        let (service, _) = service().await;
        let actor = admin_actor("admin-1");
        assert!(service.update_retention(&actor, 0).await.is_err());
        assert_eq!(service.update_retention(&actor, 90).await.unwrap().retention_days, 90);
    }

    #[tokio::test]
    async fn test_override_requires_super_admin_and_reason() {
        let (service, _) = service().await;
        let manager = admin_actor_with_role("admin-2", AdminRole::Manager);

        let err = service
            .perform_override(&manager, override_request(OverrideAction::UserStatus, "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let mut short = override_request(OverrideAction::UserStatus, "1");
        short.reason = "   too short   ".to_string();
        let err = service
            .perform_override(&admin_actor("admin-1"), short)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_force_approve_rejected_withdrawal() {
        let (service, database) = service().await;
        let rejected = database
            .find_withdrawals(&WithdrawalQuery {
                status: Some(WithdrawalStatus::Rejected),
                ..Default::default()
            })
            .await
            .unwrap()
            .remove(0);

        let response = service
            .perform_override(
                &admin_actor("admin-1"),
                override_request(OverrideAction::ForceApproveWithdrawal, &rejected.id.to_string()),
            )
            .await;

        // 余额不足时无法重新预留积分，否则应转为 approved
        match response {
            Ok(response) => {
                assert_eq!(response.withdrawal.unwrap().status, WithdrawalStatus::Approved);
                assert_eq!(response.record.admin_name, "Admin Super");
                assert_eq!(service.list_overrides().await.unwrap().len(), 1);
            }
            Err(err) => assert!(matches!(err, AppError::BadRequest(_))),
        }
    }

    #[tokio::test]
    async fn test_override_user_status_toggles() {
        let (service, _) = service().await;
        let response = service
            .perform_override(&admin_actor("admin-1"), override_request(OverrideAction::UserStatus, "13"))
            .await
            .unwrap();
        // 13 号员工初始为停用
        assert!(response.user.unwrap().is_active);
        assert_eq!(response.record.action, OverrideAction::UserStatus);
    }

    #[tokio::test]
    async fn test_admin_management() {
        let (service, _) = service().await;
        let actor = admin_actor("admin-1");

        let created = service
            .create_admin(
                &actor,
                CreateAdminRequest {
                    name: "Ops Lead".to_string(),
                    email: "ops@company.com".to_string(),
                    password: "ops-password".to_string(),
                    role: AdminRole::OperationsAdmin,
                    permissions: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.id, "admin-5");
        assert_eq!(
            created.permissions.len(),
            AdminRole::OperationsAdmin.default_permissions().len()
        );

        let duplicate = service
            .create_admin(
                &actor,
                CreateAdminRequest {
                    name: "Dup".to_string(),
                    email: "OPS@company.com".to_string(),
                    password: "ops-password".to_string(),
                    role: AdminRole::ReadOnly,
                    permissions: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(duplicate, AppError::Conflict(_)));

        let updated = service
            .update_admin(
                &actor,
                &created.id,
                UpdateAdminRequest {
                    role: Some(AdminRole::ReadOnly),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, AdminRole::ReadOnly);

        let err = service
            .update_admin(
                &actor,
                "admin-1",
                UpdateAdminRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        assert_eq!(service.list_admins().await.unwrap().len(), 5);
    }
}
