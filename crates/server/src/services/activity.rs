//! 审计日志与站内通知的写入入口，各业务 service 共用

use crate::extractors::Actor;
use database::{
    admin::repository::AdminRepositoryTrait,
    audit::{
        model::{AuditLog, NewAuditLog},
        repository::AuditRepositoryTrait,
    },
    notification::{model::NewNotification, repository::NotificationRepositoryTrait},
    settings::repository::SettingsRepositoryTrait,
    Database,
};
use tracing::{debug, warn};
use utils::AppResult;

/// 以当前管理员身份追加一条审计日志
pub async fn record_audit(
    db: &Database,
    actor: &Actor,
    action: &str,
    target: impl Into<String>,
    description: impl Into<String>,
) -> AppResult<AuditLog> {
    // 管理员被删改时仍保留令牌中的ID作为名称
    let admin_name = match db.get_admin(&actor.user.subject).await {
        Ok(admin) => admin.name,
        Err(_) => actor.user.subject.clone(),
    };

    db.append_audit_log(NewAuditLog {
        admin_id: actor.user.subject.clone(),
        admin_name,
        action: action.to_string(),
        target: target.into(),
        description: description.into(),
        ip_address: actor.ip.clone(),
    })
    .await
}

/// 推送站内通知；通知功能关闭时静默跳过
pub async fn notify(db: &Database, notification: NewNotification) -> AppResult<()> {
    if !db.get_settings().await?.features.notifications {
        debug!("🔕 通知功能已关闭，跳过: {}", notification.title);
        return Ok(());
    }

    if let Err(e) = db.push_notification(notification).await {
        warn!("⚠️ 通知写入失败: {}", e);
    }
    Ok(())
}
