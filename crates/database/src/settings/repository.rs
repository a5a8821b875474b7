use crate::{settings::model::SystemSettings, Database};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use utils::AppResult;

pub type DynSettingsRepository = Arc<dyn SettingsRepositoryTrait + Send + Sync>;

/// 对设置草稿的修改；需对任意借用生命周期成立
pub type SettingsUpdate = Box<dyn for<'s> FnOnce(&'s mut SystemSettings) -> AppResult<()> + Send>;

#[async_trait]
pub trait SettingsRepositoryTrait {
    async fn get_settings(&self) -> AppResult<SystemSettings>;

    /// 在写锁内修改设置，校验失败时不落盘
    async fn update_settings(
        &self,
        apply: Box<dyn for<'s> FnOnce(&'s mut SystemSettings) -> AppResult<()> + Send>,
    ) -> AppResult<SystemSettings>;
}

#[async_trait]
impl SettingsRepositoryTrait for Database {
    async fn get_settings(&self) -> AppResult<SystemSettings> {
        Ok(self.settings.read().await.clone())
    }

    async fn update_settings(
        &self,
        apply: SettingsUpdate,
    ) -> AppResult<SystemSettings> {
        let mut settings = self.settings.write().await;

        let mut draft = settings.clone();
        apply(&mut draft)?;
        *settings = draft;

        info!("⚙️ 系统设置已更新");
        Ok(settings.clone())
    }
}
