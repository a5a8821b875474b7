use database::pagination::{PageMeta, Pagination};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::ValidationError;

/// API成功响应包装器
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub id: String,
    /// 是否成功
    pub success: bool,

    /// 提示信息（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

impl ApiResponse<()> {
    /// 只有提示信息、没有数据的响应
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// 分页查询参数
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct PaginationQuery {
    /// 页码，从1开始
    pub page: Option<u64>,
    /// 每页条数，1..=100
    pub limit: Option<u64>,
}

impl PaginationQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageData<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T: Clone> PageData<T> {
    pub fn paginate(items: &[T], pagination: Pagination) -> Self {
        let (items, meta) = pagination.apply(items);
        Self { items, meta }
    }
}

/// 不分页的列表结果
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListData<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListData<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

/// 计数结果
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct CountData {
    pub count: usize,
}

/// 金额、汇率必须大于0
pub fn validate_positive_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_positive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positive_decimal() {
        assert!(validate_positive_decimal(&Decimal::new(5, 1)).is_ok());
        assert!(validate_positive_decimal(&Decimal::ZERO).is_err());
        assert!(validate_positive_decimal(&Decimal::from(-3)).is_err());
    }

    #[test]
    fn test_envelope_shape() {
        let response = ApiResponse::success(json!({"x": 1}));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["x"], 1);
        assert!(value.get("message").is_none());
        assert!(Uuid::parse_str(value["id"].as_str().unwrap()).is_ok());

        let value = serde_json::to_value(ApiResponse::message("done")).unwrap();
        assert_eq!(value["message"], "done");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_page_data() {
        let items: Vec<u32> = (1..=25).collect();
        let page = PageData::paginate(&items, PaginationQuery { page: Some(3), limit: Some(10) }.pagination());

        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.meta.total, 25);
        assert_eq!(page.meta.total_pages, 3);

        let beyond = PageData::paginate(&items, PaginationQuery { page: Some(9), limit: None }.pagination());
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.meta.page, 9);
    }
}
