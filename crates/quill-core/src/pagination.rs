//! Page-number resolution for post listings.
//!
//! A requested page is never an error: anything that is not an integer
//! falls back to the first page, and integers outside `1..=num_pages`
//! fall back to the last page.

use serde::Serialize;

/// Posts shown on each listing page.
pub const POSTS_PER_PAGE: u64 = 3;

/// Number of pages needed for `count` items. An empty collection still has
/// one (empty) page.
pub fn num_pages(count: u64, per_page: u64) -> u64 {
    if count == 0 || per_page == 0 {
        return 1;
    }
    count.div_ceil(per_page)
}

/// Resolve a raw `page` query value against the page count.
pub fn resolve_page(raw: Option<&str>, num_pages: u64) -> u64 {
    let Some(value) = raw.map(str::trim).filter(|value| is_integer(value)) else {
        return 1;
    };
    // Integers too wide for i64 are out of range either way.
    let Ok(number) = value.parse::<i64>() else {
        return num_pages;
    };

    if number < 1 || number as u64 > num_pages {
        num_pages
    } else {
        number as u64
    }
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// One page of a paginated collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
        }
    }
}

/// Offset/limit window for a resolved page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn resolve(raw: Option<&str>, count: u64, per_page: u64) -> Self {
        let num_pages = num_pages(count, per_page);
        let number = resolve_page(raw, num_pages);
        Self {
            number,
            num_pages,
            offset: (number - 1) * per_page,
            limit: per_page,
        }
    }

    pub fn into_page<T>(self, items: Vec<T>, count: u64) -> Page<T> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            count,
            per_page: self.limit,
        }
    }
}
