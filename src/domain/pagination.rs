//! Page-number pagination shared by the list endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::ListingConfig;

/// A normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Normalize raw query values: pages start at 1, limits are clamped.
    ///
    /// The page is capped so that its offset still fits in an `i64`.
    pub fn new(page: Option<i64>, limit: Option<i64>, listing: ListingConfig) -> Self {
        let limit = limit
            .unwrap_or(listing.default_limit)
            .clamp(1, listing.max_limit.max(1));
        Self {
            page: page.unwrap_or(1).clamp(1, i64::MAX / limit),
            limit,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One page of results with totals for the client's paginator.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page,
            limit: request.limit,
            total_pages: (total + request.limit - 1) / request.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> ListingConfig {
        ListingConfig {
            default_limit: 10,
            max_limit: 100,
        }
    }

    #[test]
    fn test_defaults_and_offset() {
        let req = PageRequest::new(None, None, listing());
        assert_eq!(req, PageRequest { page: 1, limit: 10 });
        assert_eq!(req.offset(), 0);
        assert_eq!(PageRequest::new(Some(3), Some(25), listing()).offset(), 50);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let req = PageRequest::new(Some(-2), Some(10_000), listing());
        assert_eq!(req, PageRequest { page: 1, limit: 100 });
        assert_eq!(PageRequest::new(Some(1), Some(0), listing()).limit, 1);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let req = PageRequest::new(Some(i64::MAX), Some(100), listing());
        assert_eq!(req.page, i64::MAX / 100);
        assert!(req.offset() > 0);

        let req = PageRequest::new(Some(i64::MAX), Some(1), listing());
        assert_eq!(req.offset(), i64::MAX - 1);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let req = PageRequest::new(Some(1), Some(10), listing());
        assert_eq!(Page::new(Vec::<u8>::new(), 0, req).total_pages, 0);
        assert_eq!(Page::new(Vec::<u8>::new(), 10, req).total_pages, 1);
        assert_eq!(Page::new(Vec::<u8>::new(), 21, req).total_pages, 3);
    }
}
