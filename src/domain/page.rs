use serde::Serialize;

/// One page of an admin listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Slices `items` into 1-based pages of `limit` entries. A page of 0 is
    /// read as page 1.
    pub fn paginate(items: Vec<T>, page: usize, limit: usize) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(limit);
        let items = items.into_iter().skip((page - 1).saturating_mul(limit)).take(limit).collect();
        Self { items, current_page: page, total_pages, total_items }
    }
}
