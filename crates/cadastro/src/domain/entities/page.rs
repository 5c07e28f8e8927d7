//! PagedResult - One page of an ordered result set

use serde::{Deserialize, Serialize};

/// Items of the current page plus the total across all pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    /// Authoritative for pagination even when `items` is shorter than a page
    pub total_count: u64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: u64) -> Self {
        Self { items, total_count }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}

/// Pagination control derived from a total and the page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub page_count: u32,
}

impl Pagination {
    /// `None` when everything fits on one page
    pub fn compute(total_count: u64, page_size: u32, current_page: u32) -> Option<Self> {
        if page_size == 0 || total_count <= u64::from(page_size) {
            return None;
        }

        let page_count = total_count.div_ceil(u64::from(page_size));
        Some(Self {
            current_page,
            page_count: u32::try_from(page_count).unwrap_or(u32::MAX),
        })
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.page_count
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}
