//! Pagination engine.
//!
//! Slices an ordered result set into 1-indexed pages and reports the
//! pre-slice total, so callers can render page counts and "no more results"
//! states. A page past the end is an empty page, not an error.

use crate::error::{GalleryError, Result};

/// One page of results plus the size of the full (post-filter) set.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: usize,
}

/// Slices `items` to page `page_number` of size `limit_per_page`.
///
/// Bounds are `start = (page_number - 1) * limit_per_page`,
/// `end = start + limit_per_page`, clamped to `[0, items.len()]`.
pub fn paginate<T>(items: Vec<T>, page_number: i64, limit_per_page: i64) -> Result<Page<T>> {
    if page_number < 1 {
        return Err(GalleryError::InvalidPageNumber(page_number));
    }
    if limit_per_page < 1 {
        return Err(GalleryError::InvalidPageSize(limit_per_page));
    }

    let total_count = items.len();
    let limit = limit_per_page as usize;
    let start = (page_number as usize - 1).saturating_mul(limit).min(total_count);

    let page_items = items.into_iter().skip(start).take(limit).collect();
    Ok(Page {
        items: page_items,
        total_count,
    })
}
