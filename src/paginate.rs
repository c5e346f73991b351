//! Fixed-size pagination windows.
//!
//! [`paginate`] slices an ordered sequence into windows of `items_per_page`.
//! Windows cover the input exactly, with no gaps or overlaps, and only the
//! last one may be partial:
//!
//! ```text
//! items_per_page = 6, total_items = 20
//!
//! window 0  [0, 6)    /            next → /page/2
//! window 1  [6, 12)   /page/2      prev → /, next → /page/3
//! window 2  [12, 18)  /page/3
//! window 3  [18, 20)  /page/4      (partial, no next)
//! ```
//!
//! Each window carries everything the renderer needs for "previous page /
//! next page" links. An empty sequence yields no windows.

use crate::paths::{normalize_path, window_path};
use crate::types::PaginationContext;
use std::num::NonZeroUsize;

/// Position of one window within a paginated sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationWindow {
    pub page_index: usize,
    pub items_per_page: usize,
    pub total_items: usize,
    pub base_path: String,
}

impl PaginationWindow {
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.items_per_page)
    }

    /// Offset of the first item in this window.
    pub fn skip(&self) -> usize {
        self.page_index * self.items_per_page
    }

    /// Number of items actually in this window.
    pub fn len(&self) -> usize {
        self.total_items
            .saturating_sub(self.skip())
            .min(self.items_per_page)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> String {
        window_path(&self.base_path, self.page_index)
    }

    pub fn previous_path(&self) -> Option<String> {
        self.page_index
            .checked_sub(1)
            .map(|i| window_path(&self.base_path, i))
    }

    pub fn next_path(&self) -> Option<String> {
        let next = self.page_index + 1;
        (next < self.total_pages()).then(|| window_path(&self.base_path, next))
    }

    pub fn to_context(&self) -> PaginationContext {
        PaginationContext {
            page_index: self.page_index,
            current_page: self.page_index + 1,
            items_per_page: self.items_per_page,
            total_items: self.total_items,
            total_pages: self.total_pages(),
            skip: self.skip(),
            limit: self.items_per_page,
            base_path: self.base_path.clone(),
            previous_path: self.previous_path(),
            next_path: self.next_path(),
        }
    }
}

/// One window together with its slice of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub window: PaginationWindow,
    pub items: &'a [T],
}

/// Slice `ordered` into windows of `items_per_page`.
pub fn paginate<'a, T>(
    ordered: &'a [T],
    items_per_page: NonZeroUsize,
    base_path: &str,
) -> Vec<Page<'a, T>> {
    let base_path = normalize_path(base_path);
    let total_items = ordered.len();
    ordered
        .chunks(items_per_page.get())
        .enumerate()
        .map(|(page_index, items)| Page {
            window: PaginationWindow {
                page_index,
                items_per_page: items_per_page.get(),
                total_items,
                base_path: base_path.clone(),
            },
            items,
        })
        .collect()
}
