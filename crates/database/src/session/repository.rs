use crate::{
    session::model::{RefreshSession, ResetToken, RevokedToken},
    Database,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;
use utils::AppResult;

pub type DynSessionRepository = Arc<dyn SessionRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait SessionRepositoryTrait {
    async fn store_refresh_session(&self, session: RefreshSession) -> AppResult<()>;

    /// 取出并删除（刷新令牌只能用一次）
    async fn take_refresh_session(&self, jti: &str) -> AppResult<Option<RefreshSession>>;

    /// 注销访问令牌及与之配对的刷新令牌
    async fn revoke_access_token(&self, access_jti: &str, expires_at: DateTime<Utc>) -> AppResult<()>;

    async fn is_token_revoked(&self, jti: &str) -> AppResult<bool>;

    async fn store_reset_token(&self, token: ResetToken) -> AppResult<()>;

    /// 校验未过期后删除，返回对应邮箱
    async fn consume_reset_token(&self, token: &str, now: DateTime<Utc>) -> AppResult<Option<String>>;

    /// 清理所有已过期的会话数据，返回清理数量
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> AppResult<usize>;
}

#[async_trait]
impl SessionRepositoryTrait for Database {
    async fn store_refresh_session(&self, session: RefreshSession) -> AppResult<()> {
        self.refresh_sessions.write().await.push(session);
        Ok(())
    }

    async fn take_refresh_session(&self, jti: &str) -> AppResult<Option<RefreshSession>> {
        let mut sessions = self.refresh_sessions.write().await;
        let taken = sessions
            .iter()
            .position(|s| s.jti == jti)
            .map(|index| sessions.swap_remove(index));
        Ok(taken)
    }

    async fn revoke_access_token(&self, access_jti: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        let mut sessions = self.refresh_sessions.write().await;
        let mut revoked = self.revoked_tokens.write().await;

        sessions.retain(|s| s.access_jti != access_jti);
        if !revoked.iter().any(|t| t.jti == access_jti) {
            revoked.push(RevokedToken {
                jti: access_jti.to_string(),
                expires_at,
            });
        }

        Ok(())
    }

    async fn is_token_revoked(&self, jti: &str) -> AppResult<bool> {
        Ok(self.revoked_tokens.read().await.iter().any(|t| t.jti == jti))
    }

    async fn store_reset_token(&self, token: ResetToken) -> AppResult<()> {
        let mut tokens = self.reset_tokens.write().await;
        // 每个邮箱只保留最新的一个
        tokens.retain(|t| !t.email.eq_ignore_ascii_case(&token.email));
        tokens.push(token);
        Ok(())
    }

    async fn consume_reset_token(&self, token: &str, now: DateTime<Utc>) -> AppResult<Option<String>> {
        let mut tokens = self.reset_tokens.write().await;

        let Some(index) = tokens.iter().position(|t| t.token == token) else {
            return Ok(None);
        };
        let reset = tokens.swap_remove(index);

        Ok((reset.expires_at > now).then_some(reset.email))
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut sessions = self.refresh_sessions.write().await;
        let mut revoked = self.revoked_tokens.write().await;
        let mut resets = self.reset_tokens.write().await;

        let before = sessions.len() + revoked.len() + resets.len();
        sessions.retain(|s| s.expires_at > now);
        revoked.retain(|t| t.expires_at > now);
        resets.retain(|t| t.expires_at > now);
        let purged = before - (sessions.len() + revoked.len() + resets.len());

        debug!("🧹 清理过期会话 {} 条", purged);
        Ok(purged)
    }
}
