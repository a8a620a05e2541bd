//! Offset pagination envelope shared by every list endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One page of results plus the paging bookkeeping the clients expect.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,

    /// Zero-based page index that was served.
    pub page: i64,

    /// Requested page size.
    pub size: i64,

    /// Total matching rows across all pages.
    pub total_elements: i64,

    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Assemble a page, deriving `total_pages` from the row count.
    pub fn new(content: Vec<T>, page: i64, size: i64, total_elements: i64) -> Self {
        let total_pages = if size > 0 {
            (total_elements + size - 1) / size
        } else {
            0
        };
        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }
}

/// Sort direction accepted on list endpoints. Defaults to ascending.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, ToSchema)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2, 3], 0, 20, 41);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_elements, 41);
    }

    #[test]
    fn total_pages_exact_fit() {
        let page: Page<i32> = Page::new(vec![], 1, 20, 40);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let page: Page<i32> = Page::new(vec![], 0, 20, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn direction_parses_both_cases() {
        let asc: SortDirection = serde_json::from_str("\"ASC\"").unwrap();
        let desc: SortDirection = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(asc, SortDirection::Asc);
        assert_eq!(desc, SortDirection::Desc);
        assert_eq!(desc.as_sql(), "DESC");
    }
}
