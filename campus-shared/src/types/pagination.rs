use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

/// `?page=&per_page=` query. Pages are 1-based; out-of-range values are
/// clamped rather than rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationParams {
    pub page: u64,
    pub per_page: u64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, per_page: DEFAULT_PER_PAGE }
    }
}

impl PaginationParams {
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Rows to skip, capped at `i64::MAX` so it always binds as a SQL
    /// `OFFSET`. A page past the end yields an empty page.
    pub fn offset(&self) -> i64 {
        i64::try_from((self.page() - 1).saturating_mul(self.limit())).unwrap_or(i64::MAX)
    }
}

/// One page of a listing plus enough totals to render a pager.
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub has_more: bool,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PaginationParams) -> Self {
        let (page, per_page) = (params.page(), params.limit());
        let total_pages = total.div_ceil(per_page);
        Self { items, total, page, per_page, total_pages, has_more: page < total_pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_limit_are_bounded() {
        let p = PaginationParams { page: 0, per_page: 500 };
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), MAX_PER_PAGE);

        let p = PaginationParams { page: 3, per_page: 10 };
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn huge_page_offset_stays_positive() {
        let p = PaginationParams { page: u64::MAX, per_page: 1 };
        assert_eq!(p.offset(), i64::MAX);

        let p = PaginationParams { page: u64::MAX / 2, per_page: MAX_PER_PAGE };
        assert_eq!(p.offset(), i64::MAX);
    }

    #[test]
    fn missing_query_fields_use_defaults() {
        let p: PaginationParams = serde_json::from_str(r#"{"page": 2}"#).unwrap();
        assert_eq!((p.page, p.per_page), (2, DEFAULT_PER_PAGE));
    }

    #[test]
    fn totals_describe_remaining_pages() {
        let params = PaginationParams { page: 1, per_page: 20 };
        let page = Paginated::new(vec![1, 2, 3], 41, &params);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_more);

        let last = Paginated::new(vec![1], 41, &PaginationParams { page: 3, per_page: 20 });
        assert!(!last.has_more);

        let empty: Paginated<u8> = Paginated::new(vec![], 0, &params);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_more);
    }
}
