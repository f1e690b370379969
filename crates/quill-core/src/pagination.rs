//! Page slicing for ordered listings.
//!
//! Page numbers are 1-based. A listing always has at least one page, even
//! when it is empty, so the first page can be rendered as "no posts yet".

use serde::{Deserialize, Serialize};

/// Items shown on every listing page.
pub const POSTS_PER_PAGE: u64 = 10;

/// The page a client asked for, as it arrived in the query string.
///
/// Resolution is lenient: a missing or non-numeric value selects the first
/// page, and a number outside `1..=num_pages` selects the last page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    raw: Option<String>,
}

impl PageRequest {
    pub fn new(raw: Option<String>) -> Self {
        Self { raw }
    }

    pub fn first() -> Self {
        Self::default()
    }

    pub fn number(number: u64) -> Self {
        Self {
            raw: Some(number.to_string()),
        }
    }

    /// Pick a concrete page number for a listing with `num_pages` pages.
    pub fn resolve(&self, num_pages: u64) -> u64 {
        let last = num_pages.max(1);
        let Some(raw) = self.raw.as_deref().map(str::trim) else {
            return 1;
        };
        match raw.parse::<i64>() {
            Ok(n) if n >= 1 && n as u64 <= last => n as u64,
            Ok(_) => last,
            // Integers too large for i64 are still out of range.
            Err(_) if is_integer(raw) => last,
            Err(_) => 1,
        }
    }
}

fn is_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// The slice of a listing selected by a resolved page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Splits listings into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

impl Paginator {
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page).max(1)
    }

    pub fn window(&self, total: u64, request: &PageRequest) -> PageWindow {
        let num_pages = self.num_pages(total);
        let number = request.resolve(num_pages);
        PageWindow {
            number,
            num_pages,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }

    /// Paginate an already ordered, fully loaded listing.
    pub fn paginate<T>(&self, items: Vec<T>, request: &PageRequest) -> Page<T> {
        let total = items.len() as u64;
        let window = self.window(total, request);
        let items = items
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect();
        Page::new(items, window.number, window.num_pages, total)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, num_pages: u64, total: u64) -> Self {
        Self {
            items,
            number,
            num_pages,
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(raw: &str) -> PageRequest {
        PageRequest::new(Some(raw.to_string()))
    }

    #[test]
    fn test_full_first_page_and_remainder() {
        let paginator = Paginator::default();
        let items: Vec<u32> = (1..=13).collect();

        let first = paginator.paginate(items.clone(), &PageRequest::first());
        assert_eq!(first.len(), 10);
        assert_eq!(first.num_pages, 2);
        assert!(first.has_next());
        assert_eq!(first.next_number(), Some(2));

        let second = paginator.paginate(items, &PageRequest::number(2));
        assert_eq!(second.items, vec![11, 12, 13]);
        assert!(!second.has_next());
        assert_eq!(second.previous_number(), Some(1));
    }

    #[test]
    fn test_exact_multiple_has_no_empty_trailing_page() {
        let paginator = Paginator::default();
        let page = paginator.paginate((0..20).collect::<Vec<_>>(), &PageRequest::number(2));
        assert_eq!(page.len(), 10);
        assert_eq!(page.num_pages, 2);
    }

    #[test]
    fn test_empty_listing_has_one_empty_page() {
        let page = Paginator::default().paginate(Vec::<u32>::new(), &request("3"));
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.is_empty());
    }

    #[test]
    fn test_non_numeric_page_is_first() {
        assert_eq!(request("abc").resolve(5), 1);
        assert_eq!(PageRequest::first().resolve(5), 1);
    }

    #[test]
    fn test_out_of_range_page_is_last() {
        assert_eq!(request("99").resolve(5), 5);
        assert_eq!(request("0").resolve(5), 5);
        assert_eq!(request("-2").resolve(5), 5);
        assert_eq!(request(" 3 ").resolve(5), 3);
    }

    #[test]
    fn test_overflowing_page_number_is_last() {
        assert_eq!(request("99999999999999999999").resolve(5), 5);
        assert_eq!(request("-99999999999999999999").resolve(5), 5);
        assert_eq!(request("9999999999999999999x").resolve(5), 1);
        assert_eq!(request("-").resolve(5), 1);
    }

    #[test]
    fn test_window_offsets() {
        let window = Paginator::new(10).window(25, &request("3"));
        assert_eq!(
            window,
            PageWindow {
                number: 3,
                num_pages: 3,
                offset: 20,
                limit: 10
            }
        );
    }
}
