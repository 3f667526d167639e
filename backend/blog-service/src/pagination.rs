/// Fixed-size pagination over ordered result sets.
///
/// Every listing in the service serves pages of [`PAGE_SIZE`] items. A page
/// request is 1-based and clamps silently: anything below 1 resolves to the
/// first page, anything past the end resolves to the last valid page. An
/// empty set still yields a valid (empty) first page.
use serde::{Deserialize, Serialize};

/// Number of items per page, shared by every feed.
pub const PAGE_SIZE: i64 = 10;

/// Page number plus the derived slicing bounds and navigation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// 1-based page number actually served
    pub number: i64,
    /// Total number of pages (at least 1, even for an empty set)
    pub total_pages: i64,
    /// Total number of items across all pages
    pub total_items: i64,
    pub page_size: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageMeta {
    /// Offset of the first item of this page in the ordered set.
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.page_size
    }

    /// Maximum number of items on this page.
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// A served page: the item slice plus its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Query-string page parameter (`?page=N`).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// Resolve a requested page number against a total item count.
///
/// Out-of-range requests never error: below 1 clamps to the first page,
/// beyond the end clamps to the last page.
pub fn resolve_page(total_items: i64, requested: Option<i64>) -> PageMeta {
    let total_items = total_items.max(0);
    let total_pages = ((total_items + PAGE_SIZE - 1) / PAGE_SIZE).max(1);
    let number = requested.unwrap_or(1).clamp(1, total_pages);

    PageMeta {
        number,
        total_pages,
        total_items,
        page_size: PAGE_SIZE,
        has_previous: number > 1,
        has_next: number < total_pages,
    }
}

/// Paginate an in-memory slice. Feeds backed by SQL use [`resolve_page`] with
/// LIMIT/OFFSET instead; this covers already-materialized sequences.
pub fn paginate<T: Clone>(items: &[T], requested: Option<i64>) -> Page<T> {
    let meta = resolve_page(items.len() as i64, requested);
    let start = meta.offset() as usize;
    let end = (start + meta.limit() as usize).min(items.len());
    let slice = if start >= items.len() {
        Vec::new()
    } else {
        items[start..end].to_vec()
    };

    Page { items: slice, meta }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: i64) -> Vec<i64> {
        (0..n).collect()
    }

    #[test]
    fn empty_set_yields_single_empty_page() {
        let page = paginate(&numbers(0), None);
        assert_eq!(page.items.len(), 0);
        assert_eq!(page.meta.number, 1);
        assert_eq!(page.meta.total_pages, 1);
        assert!(!page.meta.has_previous);
        assert!(!page.meta.has_next);
    }

    #[test]
    fn single_item_fits_on_one_page() {
        let page = paginate(&numbers(1), None);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.meta.total_pages, 1);
        assert!(!page.meta.has_next);
    }

    #[test]
    fn exactly_one_full_page() {
        let page = paginate(&numbers(PAGE_SIZE), None);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.meta.total_pages, 1);
        assert!(!page.meta.has_next);
    }

    #[test]
    fn one_item_past_the_boundary_spills_to_page_two() {
        let first = paginate(&numbers(PAGE_SIZE + 1), Some(1));
        assert_eq!(first.items.len(), 10);
        assert!(first.meta.has_next);
        assert!(!first.meta.has_previous);

        let second = paginate(&numbers(PAGE_SIZE + 1), Some(2));
        assert_eq!(second.items.len(), 1);
        assert!(!second.meta.has_next);
        assert!(second.meta.has_previous);
    }

    #[test]
    fn two_exact_pages() {
        let meta = resolve_page(PAGE_SIZE * 2, Some(2));
        assert_eq!(meta.total_pages, 2);
        assert_eq!(meta.number, 2);
        assert!(!meta.has_next);
        let page = paginate(&numbers(PAGE_SIZE * 2), Some(2));
        assert_eq!(page.items.len(), 10);
    }

    #[test]
    fn two_pages_plus_two() {
        let total = PAGE_SIZE * 2 + 2;
        assert_eq!(resolve_page(total, None).total_pages, 3);
        let last = paginate(&numbers(total), Some(3));
        assert_eq!(last.items.len(), 2);
        assert!(last.meta.has_previous);
        assert!(!last.meta.has_next);
    }

    #[test]
    fn twenty_three_items_make_pages_of_ten_ten_three() {
        let items = numbers(23);
        assert_eq!(paginate(&items, Some(1)).items.len(), 10);
        assert_eq!(paginate(&items, Some(2)).items.len(), 10);
        let last = paginate(&items, Some(3));
        assert_eq!(last.items.len(), 3);
        assert_eq!(last.meta.total_pages, 3);
    }

    #[test]
    fn out_of_range_requests_clamp_instead_of_erroring() {
        let items = numbers(23);
        let below = paginate(&items, Some(0));
        assert_eq!(below.meta.number, 1);
        let beyond = paginate(&items, Some(99));
        assert_eq!(beyond.meta.number, 3);
        assert_eq!(beyond.items.len(), 3);
        let negative = resolve_page(23, Some(-7));
        assert_eq!(negative.number, 1);
    }

    #[test]
    fn offsets_follow_the_page_number() {
        let meta = resolve_page(35, Some(3));
        assert_eq!(meta.offset(), 20);
        assert_eq!(meta.limit(), PAGE_SIZE);
    }

    #[test]
    fn slice_contents_preserve_order() {
        let page = paginate(&numbers(23), Some(2));
        assert_eq!(page.items, (10..20).collect::<Vec<_>>());
    }
}
