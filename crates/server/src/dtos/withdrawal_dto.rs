use crate::dtos::common::validate_positive_decimal;
use database::{
    pagination::Pagination,
    withdrawal::model::{Withdrawal, WithdrawalQuery, WithdrawalStatus},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// 管理端提现列表查询参数
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct WithdrawalListQuery {
    pub status: Option<WithdrawalStatus>,
    pub user_id: Option<i64>,
    /// 按员工姓名或收款户名搜索
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl WithdrawalListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }

    pub fn to_query(&self) -> WithdrawalQuery {
        WithdrawalQuery {
            status: self.status,
            user_id: self.user_id,
            search: self.search.clone(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct RejectWithdrawalRequest {
    #[validate(length(min = 1, max = 500, message = "Rejection reason is required"))]
    pub reason: String,
}

/// 导出格式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    BankText,
    Aba,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::BankText | ExportFormat::Aba => "text/plain; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::BankText => "txt",
            ExportFormat::Aba => "aba",
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct ExportWithdrawalsRequest {
    #[validate(length(min = 1, message = "Select at least one withdrawal to export"))]
    pub ids: Vec<i64>,
    pub format: ExportFormat,
}

/// 导出文件
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// 附带与当前汇率差额的提现记录
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalView {
    #[serde(flatten)]
    pub withdrawal: Withdrawal,
    /// 按当前汇率折算金额与锁定金额之差；汇率一致时缺省
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_difference: Option<Decimal>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct CreateWithdrawalRequest {
    /// 提现金额（货币单位）
    #[validate(custom = "validate_positive_decimal")]
    pub amount: Decimal,
    #[validate(length(min = 2, max = 100, message = "Bank name is required"))]
    pub bank_name: String,
    #[validate(length(min = 6, max = 34, message = "Account number is invalid"))]
    pub account_number: String,
    #[validate(length(min = 2, max = 100, message = "Account name is required"))]
    pub account_name: String,
}

/// 员工端提现筛选
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct StaffWithdrawalQuery {
    pub status: Option<WithdrawalStatus>,
}

/// 提现额度
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalLimits {
    pub currency: String,
    pub rate: Decimal,
    pub minimum: Decimal,
    pub maximum: Decimal,
    pub minimum_points: i64,
    pub maximum_points: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let req: CreateWithdrawalRequest = serde_json::from_value(serde_json::json!({
            "amount": 5000,
            "bank_name": "GTBank",
            "account_number": "0123456789",
            "account_name": "Adewale Johnson"
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let zero = CreateWithdrawalRequest {
            amount: Decimal::ZERO,
            ..req
        };
        assert!(zero.validate().unwrap_err().field_errors().contains_key("amount"));
    }

    #[test]
    fn test_completed_alias_in_query() {
        let query: WithdrawalListQuery = serde_urlencoded::from_str("status=completed").unwrap();
        assert_eq!(query.to_query().status, Some(WithdrawalStatus::Paid));
    }

    #[test]
    fn test_export_format() {
        let req: ExportWithdrawalsRequest =
            serde_json::from_value(serde_json::json!({"ids": [1, 2], "format": "bank_text"})).unwrap();
        assert_eq!(req.format, ExportFormat::BankText);
        assert_eq!(req.format.extension(), "txt");

        let empty = ExportWithdrawalsRequest { ids: vec![], format: ExportFormat::Csv };
        assert!(empty.validate().is_err());
    }
}
