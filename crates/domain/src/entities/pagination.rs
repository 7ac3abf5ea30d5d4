//! Provider pagination primitives

use serde::{Deserialize, Serialize};

/// A request for one provider page (page numbers start at 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number
    pub page_number: u32,
    /// Items per page
    pub page_size: u32,
}

impl PageRequest {
    /// First page with the given size
    #[must_use]
    pub const fn first(page_size: u32) -> Self {
        Self {
            page_number: 1,
            page_size,
        }
    }

    /// The page following this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            page_number: self.page_number.saturating_add(1),
            page_size: self.page_size,
        }
    }
}

/// One page of provider results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in provider order
    pub items: Vec<T>,
    /// Total item count across all pages, when reported
    pub total: Option<u64>,
}

impl<T> Page<T> {
    /// A page without a total count
    #[must_use]
    pub const fn new(items: Vec<T>) -> Self {
        Self { items, total: None }
    }

    /// A page with a total count
    #[must_use]
    pub const fn with_total(items: Vec<T>, total: u64) -> Self {
        Self {
            items,
            total: Some(total),
        }
    }

    /// Whether pages after `request` can still hold items
    #[must_use]
    pub fn has_more_after(&self, request: PageRequest) -> bool {
        if self.items.is_empty() {
            return false;
        }
        match self.total {
            Some(total) => u64::from(request.page_number) * u64::from(request.page_size) < total,
            None => self.items.len() >= request.page_size as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_increments_page_number() {
        let page = PageRequest::first(3).next();
        assert_eq!(page.page_number, 2);
        assert_eq!(page.page_size, 3);
    }

    #[test]
    fn empty_page_is_last() {
        let page: Page<u8> = Page::new(vec![]);
        assert!(!page.has_more_after(PageRequest::first(3)));
    }

    #[test]
    fn short_page_without_total_is_last() {
        let page = Page::new(vec![1, 2]);
        assert!(!page.has_more_after(PageRequest::first(3)));
        let full = Page::new(vec![1, 2, 3]);
        assert!(full.has_more_after(PageRequest::first(3)));
    }

    #[test]
    fn total_decides_when_present() {
        let page = Page::with_total(vec![1, 2, 3], 6);
        assert!(page.has_more_after(PageRequest::first(3)));
        assert!(!page.has_more_after(PageRequest::first(3).next()));
    }
}
