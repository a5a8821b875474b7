use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// 分页参数（已校验：page >= 1, 1 <= limit <= 100）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// 缺省值补齐，越界值收敛到合法区间
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> usize {
        let offset = (self.page - 1).saturating_mul(self.limit);
        usize::try_from(offset).unwrap_or(usize::MAX)
    }

    /// 对已过滤排序好的结果切片
    pub fn apply<T: Clone>(&self, items: &[T]) -> (Vec<T>, PageMeta) {
        let total = items.len() as u64;
        let page_items = items
            .iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .cloned()
            .collect();

        (page_items, PageMeta::new(total, *self))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, pagination: Pagination) -> Self {
        Self {
            total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages: total.div_ceil(pagination.limit),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// 大小写无关的子串匹配
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        assert_eq!(Pagination::new(None, None), Pagination { page: 1, limit: 10 });
        assert_eq!(Pagination::new(Some(0), Some(500)), Pagination { page: 1, limit: 100 });
        assert_eq!(Pagination::new(Some(3), Some(0)).limit, 1);
    }

    #[test]
    fn test_apply_slices_and_counts_pages() {
        let items: Vec<u32> = (1..=25).collect();
        let (page, meta) = Pagination::new(Some(3), Some(10)).apply(&items);

        assert_eq!(page, vec![21, 22, 23, 24, 25]);
        assert_eq!(meta.total, 25);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items = vec!["a", "b"];
        let (page, meta) = Pagination::new(Some(5), Some(10)).apply(&items);
        assert!(page.is_empty());
        assert_eq!(meta.total_pages, 1);
    }

    #[test]
    fn test_huge_page_is_empty() {
        let items: Vec<u32> = (1..=25).collect();
        let pagination = Pagination::new(Some(u64::MAX), Some(100));

        assert_eq!(pagination.offset(), usize::MAX);
        let (page, meta) = pagination.apply(&items);
        assert!(page.is_empty());
        assert_eq!(meta.page, u64::MAX);
        assert_eq!(meta.total_pages, 1);
    }

    #[test]
    fn test_empty_result_has_zero_pages() {
        let (page, meta) = Pagination::default().apply::<u8>(&[]);
        assert!(page.is_empty());
        assert_eq!(meta.total_pages, 0);
    }
}
