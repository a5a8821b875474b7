use crate::auth::AuthUser;
use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use std::{convert::Infallible, net::SocketAddr};
use utils::{AppError, AppResult};

/// 已认证的调用方及其来源IP，写审计日志时使用
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: AuthUser,
    pub ip: String,
}

impl Actor {
    pub fn new(user: AuthUser, ip: impl Into<String>) -> Self {
        Self { user, ip: ip.into() }
    }

    /// 员工接口中令牌对应的员工ID
    pub fn staff_id(&self) -> AppResult<i64> {
        self.user
            .staff_id()
            .ok_or_else(|| AppError::Forbidden("Staff access required".to_string()))
    }
}

fn client_ip(parts: &Parts) -> String {
    // 反向代理场景优先取 X-Forwarded-For 的第一个地址
    if let Some(forwarded) = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        Ok(Actor::new(user, client_ip(parts)))
    }
}

/// 请求来源IP，用于无需认证的接口（如登录）
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(client_ip(parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_forwarded_header_wins() {
        let mut parts = parts(Request::builder().header("x-forwarded-for", "10.0.0.7, 172.16.0.1"));
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 2], 4000))));

        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip, "10.0.0.7");
    }

    #[tokio::test]
    async fn test_connect_info_fallback() {
        let mut parts = parts(Request::builder());
        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip, "unknown");

        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 2], 4000))));
        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip, "192.168.1.2");
    }

    #[tokio::test]
    async fn test_actor_requires_authenticated_user() {
        let mut parts = parts(Request::builder());
        let err = Actor::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
