//! Fixed-size pagination with a global 1-based rank.
//!
//! `rank = page_index * page_size + index_within_page + 1`, so a single page
//! and the full page list number the same item identically.

/// An item together with its position in the whole sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked<T> {
    pub rank: usize,
    pub item: T,
}

/// One page of at most `page_size` items. `number` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub number: usize,
    pub items: Vec<Ranked<T>>,
}

/// `ceil(len / page_size)`, never less than 1.
pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a 1-based page number into `[1, page_count]`.
pub fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

/// The page with 1-based `number`, clamped into range.
pub fn page_at<T: Clone>(items: &[T], page_size: usize, number: usize) -> Page<T> {
    let size = page_size.max(1);
    let number = clamp_page(number, page_count(items.len(), size));
    let start = (number - 1) * size;

    let ranked = items
        .iter()
        .enumerate()
        .skip(start)
        .take(size)
        .map(|(i, item)| Ranked {
            rank: i + 1,
            item: item.clone(),
        })
        .collect();

    Page {
        number,
        items: ranked,
    }
}

/// Every page in order. An empty sequence yields one empty page.
pub fn paginate<T: Clone>(items: &[T], page_size: usize) -> Vec<Page<T>> {
    let size = page_size.max(1);
    (1..=page_count(items.len(), size))
        .map(|number| page_at(items, size, number))
        .collect()
}
