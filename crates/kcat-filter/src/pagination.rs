//! Page windows over a filtered result.

use std::ops::Range;

use serde::Serialize;

/// Total page count for `total_matches` items, never less than 1.
///
/// A `page_size` of 0 is treated as 1.
#[must_use]
pub fn total_pages(total_matches: usize, page_size: usize) -> usize {
    total_matches.div_ceil(page_size.max(1)).max(1)
}

/// The visible slice of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub total_matches: usize,
    pub total_pages: usize,
}

impl PageWindow {
    /// Page 0 is read as page 1; page size 0 as 1.
    #[must_use]
    pub fn new(page: usize, page_size: usize, total_matches: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page: page.max(1),
            page_size,
            total_matches,
            total_pages: total_pages(total_matches, page_size),
        }
    }

    /// Index range of this page within the result, empty past the last page.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        let start = (self.page - 1)
            .saturating_mul(self.page_size)
            .min(self.total_matches);
        let end = start.saturating_add(self.page_size).min(self.total_matches);
        start..end
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

impl std::fmt::Display for PageWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Page {} of {}", self.page, self.total_pages)
    }
}

/// Slices `items` to the requested page.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> (&[T], PageWindow) {
    let window = PageWindow::new(page, page_size, items.len());
    (&items[window.range()], window)
}
