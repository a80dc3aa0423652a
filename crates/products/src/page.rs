//! Paging value types shared by the store and the HTTP layer.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 0;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Requested page (0-based) and page size.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Number of items to skip. Saturates instead of overflowing on absurd pages.
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.page_size)
    }
}

/// A single page of items plus the totals needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: i64) -> Self {
        let total_pages = if request.page_size > 0 {
            let full = total_items / request.page_size;
            if total_items % request.page_size > 0 { full + 1 } else { full }
        } else {
            0
        };
        Self {
            items,
            page_number: request.page,
            page_size: request.page_size,
            total_items,
            total_pages,
        }
    }

    /// Slice an already-ordered collection into the requested page.
    pub fn from_ordered(all: Vec<T>, request: PageRequest) -> Self {
        let total_items = all.len() as i64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.page_size).unwrap_or(0);
        let items = all.into_iter().skip(offset).take(take).collect();
        Self::new(items, request, total_items)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 0 && self.total_pages > 0
    }

    pub fn has_next(&self) -> bool {
        self.page_number.saturating_add(1) < self.total_pages
    }

    /// Index of the last page (0 when there are no items).
    pub fn last_page(&self) -> i64 {
        (self.total_pages - 1).max(0)
    }
}
