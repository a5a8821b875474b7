use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use utils::AppError;

/// 查询参数解析失败时返回统一的 JSON 错误体
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExtractor<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryExtractor<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(QueryExtractor(value))
    }
}
