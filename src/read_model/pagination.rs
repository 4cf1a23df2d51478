use serde::Deserialize;

use crate::config::PaginationConfig;

/// Raw `?page=&limit=` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A validated 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Page below 1 becomes 1; limit is clamped to `1..=max_limit`.
    pub fn from_query(query: &PageQuery, config: &PaginationConfig) -> Self {
        let max_limit = i64::from(config.max_limit.max(1));
        let page = query.page.unwrap_or(1).clamp(1, i64::from(u32::MAX));
        let limit = query
            .limit
            .unwrap_or(i64::from(config.default_limit))
            .clamp(1, max_limit);
        Self {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            limit: u32::try_from(limit).unwrap_or(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    pub fn total_pages(&self, matching: u64) -> u64 {
        matching.div_ceil(u64::from(self.limit))
    }
}

/// One page of results plus the numbers a client needs to page on.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u64,
    pub current_page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<i64>, limit: Option<i64>) -> PageQuery {
        PageQuery { page, limit }
    }

    #[test]
    fn defaults_to_first_page_of_ten() {
        let req = PageRequest::from_query(&PageQuery::default(), &PaginationConfig::default());
        assert_eq!(req, PageRequest { page: 1, limit: 10 });
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = PaginationConfig::default();
        assert_eq!(
            PageRequest::from_query(&query(Some(0), Some(0)), &config),
            PageRequest { page: 1, limit: 1 }
        );
        assert_eq!(
            PageRequest::from_query(&query(Some(-3), Some(10_000)), &config),
            PageRequest { page: 1, limit: 100 }
        );
    }

    #[test]
    fn total_pages_rounds_up() {
        let req = PageRequest::new(1, 10);
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(10), 1);
        assert_eq!(req.total_pages(25), 3);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }
}
